//! Message dispatcher - Routes canonical commands to a reply branch

use crate::domain::entities::{Command, Route};

const RALLY_KEYWORDS: [&str; 1] = ["大會師"];
const WARRANTY_KEYWORDS: [&str; 2] = ["Zinger", "保固"];
const STICKER_KEYWORDS: [&str; 1] = ["貼紙"];
const WEATHER_SUFFIX: &str = "天氣";

/// Ordered first-match-wins rules. Club facts come before the weather
/// lookup and the generative fallback, so the model never overrides them.
#[derive(Debug, Default)]
pub struct MessageDispatcher;

impl MessageDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, command: &Command) -> Route {
        if command.contains_any(&RALLY_KEYWORDS) {
            return Route::Rally;
        }
        if command.contains_any(&WARRANTY_KEYWORDS) {
            return Route::Warranty;
        }
        if command.contains_any(&STICKER_KEYWORDS) {
            return Route::Stickers;
        }
        if let Some(location) = command.as_str().strip_suffix(WEATHER_SUFFIX) {
            return Route::Weather {
                location: location.trim().to_string(),
            };
        }
        Route::Fallback {
            command: command.clone(),
        }
    }
}
