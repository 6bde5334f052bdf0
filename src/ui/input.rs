use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    InputChar(char),
    InputBackspace,
    InputClear,
    Submit,
    Help,
    ClosePopup,
    Quit,
    None,
}

pub fn map_key(key: KeyEvent, help_open: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('u') => Action::InputClear,
            _ => Action::None,
        };
    }

    if help_open {
        return match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter => Action::ClosePopup,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Enter => Action::Submit,
        KeyCode::F(1) => Action::Help,
        KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}
