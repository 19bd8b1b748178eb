//! wttr.in client - One-line text weather summaries

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::application::errors::BotError;
use crate::domain::traits::{is_unknown_location, WeatherSource};
use crate::infrastructure::config::WeatherConfig;

/// Weather client. Metric units are always requested.
pub struct WttrClient {
    client: Client,
    base_url: String,
    lang: String,
    format: String,
}

impl WttrClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            format: config.format.clone(),
        }
    }

    /// The location is a path segment; `m` selects metric units
    fn url(&self, location: &str) -> String {
        format!("{}/{}?m", self.base_url, urlencoding::encode(location))
    }
}

impl Default for WttrClient {
    fn default() -> Self {
        Self::new(&WeatherConfig::default())
    }
}

#[async_trait]
impl WeatherSource for WttrClient {
    async fn fetch(&self, location: &str) -> Result<String, BotError> {
        let response = self.client
            .get(self.url(location))
            .query(&[("format", self.format.as_str()), ("lang", self.lang.as_str())])
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(BotError::Network(format!("Weather service error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        // wttr.in answers unresolved locations with 404 and an "Unknown location" body;
        // any other 404 is an outage
        if status == StatusCode::NOT_FOUND && !is_unknown_location(&body) {
            return Err(BotError::Network(format!("Weather service error: {}", status)));
        }

        Ok(body)
    }
}
