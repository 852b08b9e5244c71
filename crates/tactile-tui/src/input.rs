use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Scroll the page by this many lines; negative scrolls up
    Scroll(f64),
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    Reverse,          // Flip the rail direction
    ToggleController, // Attach/detach the scroll reaction
    TogglePause,
    NextItem,
    PrevItem,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        // Page scrolling
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::Scroll(1.0),
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::Scroll(-1.0),
        (KeyCode::Down, KeyModifiers::NONE) => Action::Scroll(1.0),
        (KeyCode::Up, KeyModifiers::NONE) => Action::Scroll(-1.0),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ScrollHalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,
        (KeyCode::PageDown, _) => Action::ScrollHalfPageDown,
        (KeyCode::PageUp, _) => Action::ScrollHalfPageUp,

        // Playback
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Reverse,
        (KeyCode::Char('a'), KeyModifiers::NONE) => Action::ToggleController,
        (KeyCode::Char(' '), KeyModifiers::NONE) => Action::TogglePause,

        // Item markers
        (KeyCode::Char('n'), KeyModifiers::NONE) => Action::NextItem,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::PrevItem,
        (KeyCode::Right, KeyModifiers::NONE) => Action::NextItem,
        (KeyCode::Left, KeyModifiers::NONE) => Action::PrevItem,

        _ => Action::None,
    }
}
