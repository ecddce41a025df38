/// Single-line input field with a character cap. The cursor is a byte offset
/// that always sits on a char boundary.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    max_chars: usize,
}

impl TextBuffer {
    pub fn with_limit(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            max_chars,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the contents, truncating to the cap.
    pub fn set<T: Into<String>>(&mut self, value: T) {
        let value: String = value.into();
        self.text = value.chars().take(self.max_chars).collect();
        self.cursor = self.text.len();
    }

    /// Returns false when the cap is reached or the char is a control char.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.char_count() >= self.max_chars {
            return false;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        true
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.text.drain(self.cursor..self.cursor + ch.len_utf8());
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Cursor position in chars, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_places_cursor_at_end_and_truncates() {
        let mut buffer = TextBuffer::with_limit(5);
        buffer.set("hello world");

        assert_eq!(buffer.as_str(), "hello");
        assert_eq!(buffer.cursor_column(), 5);
    }

    #[test]
    fn insert_stops_at_limit() {
        let mut buffer = TextBuffer::with_limit(3);
        assert!(buffer.insert_char('a'));
        assert!(buffer.insert_char('b'));
        assert!(buffer.insert_char('c'));
        assert!(!buffer.insert_char('d'));
        assert_eq!(buffer.as_str(), "abc");
    }

    #[test]
    fn editing_respects_multibyte_chars() {
        let mut buffer = TextBuffer::with_limit(10);
        buffer.set("café");
        buffer.move_left();
        buffer.insert_char('x');
        assert_eq!(buffer.as_str(), "cafxé");

        buffer.move_end();
        buffer.backspace();
        assert_eq!(buffer.as_str(), "cafx");

        buffer.move_home();
        buffer.delete_char();
        assert_eq!(buffer.as_str(), "afx");
        assert_eq!(buffer.cursor_column(), 0);
    }

    #[test]
    fn rejects_control_chars() {
        let mut buffer = TextBuffer::with_limit(10);
        assert!(!buffer.insert_char('\n'));
        assert!(buffer.is_blank());
    }
}
