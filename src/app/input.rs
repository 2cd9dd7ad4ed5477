use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The key commands dialogs react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Tab,
    BackTab,
    Left,
    Right,
    Up,
    Down,
    Enter,
    Backspace,
    Char(char),
    Ignored,
}

impl KeyInput {
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            KeyInput::Left | KeyInput::Right | KeyInput::Up | KeyInput::Down
        )
    }
}

pub fn classify(key: &KeyEvent) -> KeyInput {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return match key.code {
            // terminals without a dedicated backspace key send ^H
            KeyCode::Char('h') if key.modifiers == KeyModifiers::CONTROL => KeyInput::Backspace,
            _ => KeyInput::Ignored,
        };
    }

    match key.code {
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => KeyInput::BackTab,
        KeyCode::Tab => KeyInput::Tab,
        KeyCode::BackTab => KeyInput::BackTab,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Char('\n' | '\r') => KeyInput::Enter,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Char(ch) if !ch.is_control() => KeyInput::Char(ch),
        _ => KeyInput::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn shift_tab_variants_map_to_back_tab() {
        assert_eq!(
            classify(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            KeyInput::BackTab
        );
        assert_eq!(
            classify(&key(KeyCode::Tab, KeyModifiers::SHIFT)),
            KeyInput::BackTab
        );
        assert_eq!(classify(&key(KeyCode::Tab, KeyModifiers::NONE)), KeyInput::Tab);
    }

    #[test]
    fn shifted_characters_are_text() {
        assert_eq!(
            classify(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            KeyInput::Char('A')
        );
    }

    #[test]
    fn control_chords_are_ignored() {
        assert_eq!(
            classify(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            KeyInput::Ignored
        );
        assert_eq!(
            classify(&key(KeyCode::Char('h'), KeyModifiers::CONTROL)),
            KeyInput::Backspace
        );
        assert_eq!(classify(&key(KeyCode::Esc, KeyModifiers::NONE)), KeyInput::Ignored);
    }
}
