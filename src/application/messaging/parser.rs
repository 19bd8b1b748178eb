//! Message parser - Turns eligible raw text into a canonical command

use crate::domain::entities::Command;
use super::gatekeeper::DEFAULT_MARKER;

/// Punctuation removed anywhere in the text, ASCII and full-width forms
const NOISE_CHARS: [char; 8] = ['?', '!', '.', ',', '？', '！', '。', '，'];

pub struct MessageParser {
    marker: char,
}

impl MessageParser {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// Normalize eligible text. Returns `None` when nothing is left,
    /// in which case the event gets no reply.
    pub fn normalize(&self, text: &str) -> Option<Command> {
        // Exactly one marker is removed; "##x" keeps its second '#'
        let text = match text.strip_prefix(self.marker) {
            Some(rest) => rest.trim(),
            None => text,
        };

        let canonical: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && !NOISE_CHARS.contains(c))
            .collect();

        Command::new(canonical)
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
