use std::time::{Duration, Instant};

/// Inactivity window before the top controls and navigation slide away.
pub const HIDE_DELAY: Duration = Duration::from_millis(2000);

/// Auto-hide state for the deck's control bars.
#[derive(Debug, Clone)]
pub struct AutoHide {
    delay: Duration,
    hide_at: Option<Instant>,
    hidden: bool,
}

impl AutoHide {
    /// Controls start visible with the hide window already running.
    pub fn new(now: Instant) -> Self {
        Self::with_delay(now, HIDE_DELAY)
    }

    pub fn with_delay(now: Instant, delay: Duration) -> Self {
        Self {
            delay,
            hide_at: Some(now + delay),
            hidden: false,
        }
    }

    /// Mouse movement or a key press.
    pub fn activity(&mut self, now: Instant) {
        self.hidden = false;
        self.hide_at = Some(now + self.delay);
    }

    /// Pointer entered the controls; they stay up until it leaves.
    pub fn hover_enter(&mut self) {
        self.hidden = false;
        self.hide_at = None;
    }

    pub fn hover_leave(&mut self, now: Instant) {
        self.hide_at = Some(now + self.delay);
    }

    /// Apply an elapsed deadline. Returns whether the controls are visible.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.hidden = true;
                self.hide_at = None;
            }
        }
        !self.hidden
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_after_inactivity() {
        let t0 = Instant::now();
        let mut controls = AutoHide::new(t0);
        assert!(controls.poll(t0 + Duration::from_millis(1999)));
        assert!(!controls.poll(t0 + HIDE_DELAY));
    }

    #[test]
    fn activity_brings_controls_back_and_restarts_window() {
        let t0 = Instant::now();
        let mut controls = AutoHide::new(t0);
        controls.poll(t0 + Duration::from_secs(3));
        assert!(!controls.is_visible());

        let t1 = t0 + Duration::from_secs(5);
        controls.activity(t1);
        assert!(controls.is_visible());
        assert!(controls.poll(t1 + Duration::from_millis(1500)));
        assert!(!controls.poll(t1 + Duration::from_millis(2500)));
    }

    #[test]
    fn hover_pins_controls() {
        let t0 = Instant::now();
        let mut controls = AutoHide::new(t0);
        controls.hover_enter();
        assert!(controls.poll(t0 + Duration::from_secs(60)));

        let t1 = t0 + Duration::from_secs(61);
        controls.hover_leave(t1);
        assert!(!controls.poll(t1 + HIDE_DELAY));
    }
}
