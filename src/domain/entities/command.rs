use std::fmt;

/// Canonical form of the user's text: marker removed, whitespace and
/// punctuation stripped. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    /// Wrap an already-normalized string, `None` if it is empty
    pub fn new(canonical: impl Into<String>) -> Option<Self> {
        let canonical = canonical.into();
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.0.contains(k))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The branch selected for a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Club rally announcement
    Rally,
    /// Zinger model and warranty info
    Warranty,
    /// Club sticker purchase info
    Stickers,
    /// Weather lookup; `location` is whatever preceded the suffix and may be empty
    Weather { location: String },
    /// Nothing matched, delegate to the generative service
    Fallback { command: Command },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Rally => "rally",
            Route::Warranty => "warranty",
            Route::Stickers => "stickers",
            Route::Weather { .. } => "weather",
            Route::Fallback { .. } => "fallback",
        }
    }
}
