//! Gatekeeper - Decides whether the bot speaks at all
//!
//! In group chats the bot must stay quiet unless addressed. A message is
//! eligible when it starts with the marker, or when it contains one of the
//! rich-menu keywords (menu buttons send bare text without the marker).

use crate::infrastructure::config::BotConfig;

pub const DEFAULT_MARKER: char = '#';

pub const DEFAULT_MENU_KEYWORDS: [&str; 5] = ["大會師", "Zinger", "保固", "貼紙", "購買貼紙"];

pub struct Gatekeeper {
    marker: char,
    menu_keywords: Vec<String>,
}

impl Gatekeeper {
    pub fn new(marker: char, menu_keywords: Vec<String>) -> Self {
        Self {
            marker,
            menu_keywords,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.marker, config.menu_keywords.clone())
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// `text` is expected to be trimmed already
    pub fn is_eligible(&self, text: &str) -> bool {
        text.starts_with(self.marker) || self.menu_keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::new(
            DEFAULT_MARKER,
            DEFAULT_MENU_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        )
    }
}
