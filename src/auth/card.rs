use once_cell::sync::Lazy;
use regex::Regex;

/// The name token printed on the instructor's ID card, `LAST/FIRST`.
pub const INSTRUCTOR_CARD_PATTERN: &str = "REED/BOBBY";
pub const INSTRUCTOR_NAME: &str = "Bobby Reed";

/// Track 1 ends with this sentinel; a swipe is complete once it shows up.
const END_SENTINEL: char = '?';

static NAME_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\^([^/]+)/([^\^]+)\^").expect("card name pattern is valid")
});

/// Pull `LAST/FIRST` out of raw magnetic stripe data like
/// `%B6010...^REED/BOBBY   ^2612...?`.
pub fn parse_card_data(raw: &str) -> Option<String> {
    let caps = NAME_FIELD.captures(raw)?;
    let last = caps.get(1)?.as_str().trim();
    let first = caps.get(2)?.as_str().trim();
    Some(format!("{last}/{first}"))
}

pub fn is_instructor_card(raw: &str) -> bool {
    parse_card_data(raw).as_deref() == Some(INSTRUCTOR_CARD_PATTERN)
}

/// Card readers act as keyboards and type the track one chunk at a time.
#[derive(Debug, Default)]
pub struct SwipeBuffer {
    buf: String,
}

impl SwipeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append input. Returns the full swipe and clears the buffer once the
    /// end sentinel has arrived.
    pub fn push(&mut self, input: &str) -> Option<String> {
        self.buf.push_str(input);
        if self.buf.contains(END_SENTINEL) {
            Some(std::mem::take(&mut self.buf))
        } else {
            None
        }
    }

    pub fn pending(&self) -> &str {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
