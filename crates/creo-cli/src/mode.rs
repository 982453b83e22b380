//! Screen routing state machine.
//!
//! The app is always in exactly one mode; transitions are a pure function
//! of (current mode, event), so the routing loop carries no ambient
//! booleans.

/// Which screen owns the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Home,
    Chat,
    Tracker,
}

/// Navigation events the screens emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    OpenChat,
    OpenTracker,
    Back,
}

/// Compute the next mode. Screen-open events only apply from the home
/// screen; `Back` always returns home.
pub fn transition(mode: AppMode, event: ScreenEvent) -> AppMode {
    match (mode, event) {
        (AppMode::Home, ScreenEvent::OpenChat) => AppMode::Chat,
        (AppMode::Home, ScreenEvent::OpenTracker) => AppMode::Tracker,
        (_, ScreenEvent::Back) => AppMode::Home,
        (current, _) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_opens_screens() {
        assert_eq!(transition(AppMode::Home, ScreenEvent::OpenChat), AppMode::Chat);
        assert_eq!(
            transition(AppMode::Home, ScreenEvent::OpenTracker),
            AppMode::Tracker
        );
    }

    #[test]
    fn test_back_always_returns_home() {
        for mode in [AppMode::Home, AppMode::Chat, AppMode::Tracker] {
            assert_eq!(transition(mode, ScreenEvent::Back), AppMode::Home);
        }
    }

    #[test]
    fn test_open_events_ignored_outside_home() {
        assert_eq!(transition(AppMode::Chat, ScreenEvent::OpenTracker), AppMode::Chat);
        assert_eq!(transition(AppMode::Tracker, ScreenEvent::OpenChat), AppMode::Tracker);
    }
}
