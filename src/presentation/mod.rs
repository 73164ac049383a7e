//! State machine behind the lecture slide deck: navigation, theme,
//! fullscreen, the countdown timer and auto-hiding controls.
//!
//! Time is always passed in by the caller so the controller can be driven
//! from a render loop or a test alike.

pub mod controls;
pub mod deck;
pub mod theme;
pub mod timer;

use std::time::Instant;

use tracing::warn;

pub use controls::AutoHide;
pub use deck::{Deck, SlideChange};
pub use theme::{PreferenceStore, THEME_KEY, Theme, load_theme};
pub use timer::{Countdown, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Home,
    End,
    Escape,
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            " " => Some(Key::Space),
            "Home" => Some(Key::Home),
            "End" => Some(Key::End),
            "Escape" => Some(Key::Escape),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prev,
    Next,
    First,
    Last,
    ToggleFullscreen,
    ToggleTheme,
    ExitFullscreen,
}

impl Command {
    pub fn for_key(key: Key) -> Option<Self> {
        match key {
            Key::ArrowLeft => Some(Command::Prev),
            Key::ArrowRight | Key::Space => Some(Command::Next),
            Key::Home => Some(Command::First),
            Key::End => Some(Command::Last),
            Key::Char('f' | 'F') => Some(Command::ToggleFullscreen),
            Key::Char('t' | 'T') => Some(Command::ToggleTheme),
            Key::Escape => Some(Command::ExitFullscreen),
            Key::Char(_) => None,
        }
    }
}

/// What the view has to update after an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SlideChanged(SlideChange),
    ThemeChanged(Theme),
    FullscreenChanged(bool),
}

pub struct PresentationController<P: PreferenceStore> {
    deck: Deck,
    theme: Theme,
    fullscreen: bool,
    timer: Option<Countdown>,
    controls: AutoHide,
    prefs: P,
}

impl<P: PreferenceStore> PresentationController<P> {
    /// The saved theme is applied before anything else.
    pub fn new(total_slides: usize, prefs: P, now: Instant) -> Self {
        Self {
            theme: load_theme(&prefs),
            deck: Deck::new(total_slides),
            fullscreen: false,
            timer: None,
            controls: AutoHide::new(now),
            prefs,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> Option<Effect> {
        self.controls.activity(now);
        Command::for_key(key).and_then(|cmd| self.execute(cmd))
    }

    pub fn execute(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::Prev => self.deck.prev().map(Effect::SlideChanged),
            Command::Next => self.deck.next().map(Effect::SlideChanged),
            Command::First => self.deck.first().map(Effect::SlideChanged),
            Command::Last => self.deck.last().map(Effect::SlideChanged),
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                Some(Effect::FullscreenChanged(self.fullscreen))
            }
            Command::ExitFullscreen => {
                if !self.fullscreen {
                    return None;
                }
                self.fullscreen = false;
                Some(Effect::FullscreenChanged(false))
            }
            Command::ToggleTheme => Some(Effect::ThemeChanged(self.set_theme(self.theme.toggled()))),
        }
    }

    pub fn go_to(&mut self, slide: usize) -> Option<Effect> {
        self.deck.go_to(slide).map(Effect::SlideChanged)
    }

    /// Theme checkbox or `t`. A failed save keeps the new theme for this view.
    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        if let Err(e) = self.prefs.save(THEME_KEY, &theme.to_string()) {
            warn!(error = %e, %theme, "Failed to persist theme");
        }
        theme
    }

    /// Replaces any countdown that is already running.
    pub fn start_timer(&mut self, minutes: u64) {
        self.timer = Some(Countdown::start(minutes));
    }

    pub fn stop_timer(&mut self) {
        self.timer = None;
    }

    /// The timer row is shown from start until it is stopped.
    pub fn timer_visible(&self) -> bool {
        self.timer.is_some()
    }

    /// Called once per second while a timer is shown.
    pub fn tick_timer(&mut self) -> Option<TimerEvent> {
        self.timer.as_mut()?.tick()
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.controls.activity(now);
    }

    pub fn controls_hovered(&mut self) {
        self.controls.hover_enter();
    }

    pub fn controls_left(&mut self, now: Instant) {
        self.controls.hover_leave(now);
    }

    pub fn controls_visible(&mut self, now: Instant) -> bool {
        self.controls.poll(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::theme::MemoryPreferences;
    use std::time::Duration;

    fn controller(total: usize) -> PresentationController<MemoryPreferences> {
        PresentationController::new(total, MemoryPreferences::default(), Instant::now())
    }

    #[test]
    fn dom_key_names_map_to_commands() {
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("t"), Some(Key::Char('t')));
        assert_eq!(Key::from_dom("Shift"), None);

        assert_eq!(Command::for_key(Key::Space), Some(Command::Next));
        assert_eq!(Command::for_key(Key::Char('F')), Some(Command::ToggleFullscreen));
        assert_eq!(Command::for_key(Key::Char('x')), None);
    }

    #[test]
    fn keys_stay_within_the_deck() {
        let mut p = controller(3);
        let now = Instant::now();

        assert_eq!(p.handle_key(Key::ArrowLeft, now), None);
        p.handle_key(Key::End, now);
        assert_eq!(p.deck().current(), 2);
        assert_eq!(p.handle_key(Key::Space, now), None);
        assert_eq!(
            p.handle_key(Key::Home, now),
            Some(Effect::SlideChanged(SlideChange {
                current_slide: 0,
                total_slides: 3
            }))
        );
    }

    #[test]
    fn theme_toggle_is_persisted() {
        let mut prefs = MemoryPreferences::default();
        prefs.save(THEME_KEY, "dark").unwrap();
        let mut p = PresentationController::new(5, prefs, Instant::now());
        assert_eq!(p.theme(), Theme::Dark);

        assert_eq!(
            p.handle_key(Key::Char('T'), Instant::now()),
            Some(Effect::ThemeChanged(Theme::Light))
        );
        assert_eq!(p.prefs.load(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn escape_only_leaves_fullscreen() {
        let mut p = controller(1);
        assert_eq!(p.execute(Command::ExitFullscreen), None);
        assert_eq!(
            p.execute(Command::ToggleFullscreen),
            Some(Effect::FullscreenChanged(true))
        );
        assert_eq!(
            p.execute(Command::ExitFullscreen),
            Some(Effect::FullscreenChanged(false))
        );
    }

    #[test]
    fn starting_a_timer_replaces_the_running_one() {
        let mut p = controller(1);
        p.start_timer(10);
        p.tick_timer();
        p.start_timer(2);
        assert_eq!(p.tick_timer(), Some(TimerEvent::Display("Time: 2:00".into())));

        p.stop_timer();
        assert!(!p.timer_visible());
        assert_eq!(p.tick_timer(), None);
    }

    #[test]
    fn key_presses_keep_controls_visible() {
        let t0 = Instant::now();
        let mut p = PresentationController::new(4, MemoryPreferences::default(), t0);
        assert!(!p.controls_visible(t0 + Duration::from_secs(3)));

        let t1 = t0 + Duration::from_secs(4);
        p.handle_key(Key::ArrowRight, t1);
        assert!(p.controls_visible(t1 + Duration::from_secs(1)));
    }
}
