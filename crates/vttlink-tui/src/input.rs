//! Single-line input editor.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key presses the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Delete before the cursor.
    Backspace,
    /// Delete under the cursor.
    Delete,
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Move to start of line.
    Home,
    /// Move to end of line.
    End,
    /// Submit the line.
    Enter,
    /// Leave the application.
    Quit,
}

impl KeyInput {
    /// Translate a terminal key event. Releases and unbound keys map to `None`.
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Char('c' | 'd') if ctrl => Some(Self::Quit),
            KeyCode::Char('a') if ctrl => Some(Self::Home),
            KeyCode::Char('e') if ctrl => Some(Self::End),
            KeyCode::Char(c) if !ctrl => Some(Self::Char(c)),
            KeyCode::Backspace => Some(Self::Backspace),
            KeyCode::Delete => Some(Self::Delete),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Home => Some(Self::Home),
            KeyCode::End => Some(Self::End),
            KeyCode::Enter => Some(Self::Enter),
            KeyCode::Esc => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Line buffer with a character-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply an editing key. Returns the submitted line on `Enter`.
    ///
    /// `Quit` is not an editing key and leaves the buffer untouched.
    pub fn apply(&mut self, key: KeyInput) -> Option<String> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
            },
            KeyInput::Delete if self.cursor < self.len() => {
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter => return Some(self.take()),
            KeyInput::Backspace | KeyInput::Delete | KeyInput::Quit => {},
        }
        None
    }

    /// Clear the buffer and return its contents.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::default();
        for c in text.chars() {
            input.apply(KeyInput::Char(c));
        }
        input
    }

    #[test]
    fn typing_and_submit() {
        let mut input = typed("hi there");
        assert_eq!(input.apply(KeyInput::Enter), Some("hi there".to_string()));
        assert_eq!(input.text(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn editing_in_the_middle() {
        let mut input = typed("helo");
        input.apply(KeyInput::Left);
        input.apply(KeyInput::Char('l'));
        assert_eq!(input.text(), "hello");
        input.apply(KeyInput::Home);
        input.apply(KeyInput::Delete);
        assert_eq!(input.text(), "ello");
        input.apply(KeyInput::End);
        input.apply(KeyInput::Backspace);
        assert_eq!(input.text(), "ell");
    }

    #[test]
    fn multibyte_characters() {
        let mut input = typed("café");
        input.apply(KeyInput::Backspace);
        assert_eq!(input.text(), "caf");
        input.apply(KeyInput::Char('é'));
        input.apply(KeyInput::Home);
        input.apply(KeyInput::Char('¡'));
        assert_eq!(input.text(), "¡café");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn cursor_is_bounded() {
        let mut input = typed("ab");
        input.apply(KeyInput::Right);
        assert_eq!(input.cursor(), 2);
        input.apply(KeyInput::Home);
        input.apply(KeyInput::Left);
        input.apply(KeyInput::Backspace);
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.text(), "ab");
    }

    #[test]
    fn key_translation() {
        let key = |code, modifiers| KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(
            KeyInput::from_event(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(KeyInput::Char('x'))
        );
        assert_eq!(
            KeyInput::from_event(&key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(KeyInput::Char('X'))
        );
        assert_eq!(
            KeyInput::from_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyInput::Quit)
        );
        assert_eq!(KeyInput::from_event(&key(KeyCode::F(1), KeyModifiers::NONE)), None);

        let mut release = key(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(KeyInput::from_event(&release), None);
    }
}
