use serde::Serialize;

/// Emitted after every slide change, mirrors the deck's `slidechange` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideChange {
    pub current_slide: usize,
    pub total_slides: usize,
}

/// Slide position. Never wraps: at the edges the move is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    current: usize,
    total: usize,
}

impl Deck {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// "Slide 3 / 12"
    pub fn counter(&self) -> (usize, usize) {
        (self.current + 1, self.total)
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.total
    }

    pub fn next(&mut self) -> Option<SlideChange> {
        if !self.can_go_forward() {
            return None;
        }
        self.show(self.current + 1)
    }

    pub fn prev(&mut self) -> Option<SlideChange> {
        if !self.can_go_back() {
            return None;
        }
        self.show(self.current - 1)
    }

    pub fn first(&mut self) -> Option<SlideChange> {
        self.show(0)
    }

    pub fn last(&mut self) -> Option<SlideChange> {
        self.show(self.total.checked_sub(1)?)
    }

    /// Out-of-range targets are ignored.
    pub fn go_to(&mut self, slide: usize) -> Option<SlideChange> {
        self.show(slide)
    }

    fn show(&mut self, slide: usize) -> Option<SlideChange> {
        if slide >= self.total {
            return None;
        }
        self.current = slide;
        Some(SlideChange {
            current_slide: self.current,
            total_slides: self.total,
        })
    }
}
