use async_trait::async_trait;
use crate::application::errors::BotError;

/// Bot trait - abstraction for the messaging platform's reply side
#[async_trait]
pub trait Bot: Send + Sync {
    /// Reply to an inbound event. The token is single-use; callers must not retry.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub basic_id: Option<String>,
}
