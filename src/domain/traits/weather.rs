use async_trait::async_trait;
use crate::application::errors::BotError;

/// Body marker wttr.in uses when it cannot resolve a location, compared lowercase
const UNKNOWN_LOCATION_MARKER: &str = "unknown location";

/// True when a summary body reports an unresolved location
pub fn is_unknown_location(body: &str) -> bool {
    body.to_lowercase().contains(UNKNOWN_LOCATION_MARKER)
}

/// Text weather summary service
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the raw summary body for a location. Non-2xx responses are errors,
    /// except a 404 whose body reports an unknown location.
    async fn fetch(&self, location: &str) -> Result<String, BotError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_location_marker() {
        assert!(is_unknown_location("Unknown location; please try ~25.0,121.5"));
        assert!(is_unknown_location("ERROR: UNKNOWN LOCATION"));
        assert!(!is_unknown_location("<html>Page Not Found</html>"));
        assert!(!is_unknown_location("404: ☀️ +26°C"));
    }
}
