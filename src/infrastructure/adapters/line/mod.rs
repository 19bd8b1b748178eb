//! LINE Messaging API adapter

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// LINE API base URL
const API_BASE: &str = "https://api.line.me";

/// Header carrying the webhook body signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE rejects text messages longer than this many characters
const MAX_TEXT_CHARS: usize = 5000;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature: base64(HMAC-SHA256(channel secret, raw body))
pub fn verify_signature(body: &[u8], signature: &str, channel_secret: &str) -> bool {
    let expected = match BASE64.decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Signature header is not valid base64");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::warn!("Failed to create HMAC");
            return false;
        }
    };

    mac.update(body);
    // verify_slice compares in constant time
    mac.verify_slice(&expected).is_ok()
}

/// Compute the signature LINE would send for `body`
pub fn sign(body: &[u8], channel_secret: &str) -> Result<String, BotError> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| BotError::Auth(e.to_string()))?;
    mac.update(body);
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Cut text to the platform limit on a character boundary
fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

/// LINE bot adapter
pub struct LineAdapter {
    channel_access_token: String,
    client: Client,
    api_base: String,
    info: BotInfo,
}

impl LineAdapter {
    pub fn new(channel_access_token: impl Into<String>) -> Self {
        Self {
            channel_access_token: channel_access_token.into(),
            client: Client::new(),
            api_base: API_BASE.to_string(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "tczc-bot".to_string(),
                basic_id: None,
            },
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API URL for a path
    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/{}", self.api_base, path)
    }

    /// Fetch bot info from the LINE API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct BotInfoResponse {
            user_id: String,
            basic_id: Option<String>,
            display_name: String,
        }

        let response = self.client
            .get(self.api_url("info"))
            .bearer_auth(&self.channel_access_token)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if response.status() == 401 {
            return Err(BotError::Auth("LINE rejected the channel access token".to_string()));
        }

        if !response.status().is_success() {
            return Err(BotError::Network(format!("LINE API error: {}", response.status())));
        }

        let data: BotInfoResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        self.info = BotInfo {
            id: data.user_id,
            name: data.display_name,
            basic_id: data.basic_id,
        };

        Ok(())
    }
}

#[async_trait]
impl Bot for LineAdapter {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), BotError> {
        tracing::debug!("Replying to {}: {}", reply_token, text);

        let request = ReplyRequest {
            reply_token,
            messages: vec![TextMessage {
                message_type: "text",
                text: truncate_text(text),
            }],
        };

        let response = self.client
            .post(self.api_url("message/reply"))
            .bearer_auth(&self.channel_access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("LINE reply failed: {} {}", status, error)));
        }

        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
