use crate::app::{App, InputMode};
use crate::ui;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Down,
    Up,
    PageDown,
    PageUp,
    Top,
    Bottom,
    StartSearch,
    Reset,
    SubmitInput,
    CancelInput,
    Backspace,
    InputChar(char),
}

/// The closed set of terminal events the loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Other,
}

impl From<Event> for InputEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Self::Key(key),
            Event::Resize(width, height) => Self::Resize { width, height },
            _ => Self::Other,
        }
    }
}

/// Routes one event into the app. `width`/`height` of a resize are terminal
/// dimensions; the list viewport is derived from them.
pub fn dispatch(app: &mut App, event: InputEvent) {
    match event {
        InputEvent::Key(key) => {
            if let Some(action) = map_key(app.mode(), key) {
                app.apply_action(action);
            }
        }
        InputEvent::Resize { width, height } => {
            let (list_width, list_height) = ui::list_viewport(width, height);
            app.resize(list_width, list_height);
        }
        InputEvent::Other => {}
    }
}

/// Search mode is checked first so that every printable key typed into the
/// query is text, even when it doubles as a browse binding.
pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Search => map_search_mode_key(key),
        InputMode::Browse => map_browse_mode_key(key),
    }
}

fn map_search_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Esc => Some(Action::CancelInput),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::SubmitInput)
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

fn map_browse_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::PageDown)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageUp),
        _ if !key.modifiers.is_empty() && key.modifiers != KeyModifiers::SHIFT => None,
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Esc => Some(Action::Reset),
        _ => None,
    }
}
