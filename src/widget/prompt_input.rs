//! Prompt Input: Single-line editor for the agent description.
//!
//! Editing only; drawing is done by the surface from the editor's content
//! and cursor column.

use crate::actor::{InputEvent, KeyCode};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Editable prompt with a cursor.
#[derive(Debug, Default, Clone)]
pub struct PromptEditor {
    /// Current text content.
    content: String,
    /// Cursor position, as a byte offset on a grapheme boundary.
    cursor: usize,
}

impl PromptEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content, moving the cursor to the end.
    pub fn set_content(&mut self, content: &str) {
        self.content.clear();
        self.insert_str(content);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Whether the editor is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display column of the cursor.
    pub fn cursor_column(&self) -> usize {
        UnicodeWidthStr::width(&self.content[..self.cursor])
    }

    /// Apply an editing event.
    ///
    /// Returns `true` if the event was consumed. Keys with Control or Alt
    /// held are left for the caller.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Paste(text) => {
                self.insert_str(text);
                true
            }
            InputEvent::Key { code, modifiers } if !modifiers.control && !modifiers.alt => {
                match code {
                    KeyCode::Char(c) => self.insert_char(*c),
                    KeyCode::Backspace => self.backspace(),
                    KeyCode::Delete => self.delete(),
                    KeyCode::Left => self.cursor_left(),
                    KeyCode::Right => self.cursor_right(),
                    KeyCode::Home => self.cursor = 0,
                    KeyCode::End => self.cursor = self.content.len(),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    fn insert_char(&mut self, c: char) {
        let c = if c.is_control() { ' ' } else { c };
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text; line breaks become spaces.
    fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(if c == '\n' { ' ' } else { c });
        }
    }

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.content.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    fn delete(&mut self) {
        let next = self.next_boundary();
        self.content.replace_range(self.cursor..next, "");
    }

    fn cursor_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    fn cursor_right(&mut self) {
        self.cursor = self.next_boundary();
    }
}
