use std::time::Duration;

/// Text shown once the countdown reaches zero.
pub const TIMES_UP: &str = "Time's up!";

/// How long the screen shakes when the alarm fires.
pub const SHAKE_DURATION: Duration = Duration::from_secs(2);

/// One tone of the alarm, offsets relative to the moment the timer expires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beep {
    pub frequency_hz: f32,
    pub start: Duration,
    pub duration: Duration,
    pub gain: f32,
}

/// Six square-wave beeps alternating A5 and C6.
pub fn alarm_beeps() -> Vec<Beep> {
    (0..6u32)
        .map(|i| Beep {
            frequency_hz: if i % 2 == 0 { 880.0 } else { 1046.5 },
            start: Duration::from_millis(300) * i,
            duration: Duration::from_millis(250),
            gain: 0.6,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// New label for the timer row, e.g. `Time: 4:05`
    Display(String),
    /// Countdown finished: show [`TIMES_UP`], play the beeps, shake the screen
    Expired { beeps: Vec<Beep>, shake: Duration },
}

/// A countdown driven by one tick per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
    finished: bool,
}

impl Countdown {
    pub fn start(minutes: u64) -> Self {
        Self {
            remaining_secs: minutes.saturating_mul(60),
            finished: false,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one second. Returns `None` once the alarm has already fired.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.finished {
            return None;
        }

        if self.remaining_secs == 0 {
            self.finished = true;
            return Some(TimerEvent::Expired {
                beeps: alarm_beeps(),
                shake: SHAKE_DURATION,
            });
        }

        let label = format_remaining(self.remaining_secs);
        self.remaining_secs -= 1;
        Some(TimerEvent::Display(label))
    }
}

pub fn format_remaining(secs: u64) -> String {
    format!("Time: {}:{:02}", secs / 60, secs % 60)
}
