use serde::{Deserialize, Serialize};
use super::EventSource;

/// Body of one webhook call. A single call may batch several events.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

/// One inbound event. Only `message` events carrying a text message are answered;
/// follows, joins, postbacks, stickers and images all arrive here too.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: Option<EventMessage>,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub webhook_event_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: Option<String>,
    pub text: Option<String>,
}

impl InboundEvent {
    pub fn text(reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            event_type: "message".to_string(),
            message: Some(EventMessage {
                message_type: "text".to_string(),
                id: None,
                text: Some(text.into()),
            }),
            reply_token: Some(reply_token.into()),
            source: None,
            webhook_event_id: None,
        }
    }

    pub fn with_source(mut self, source: EventSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Reply token and text of a text-message event, `None` for anything else
    pub fn text_message(&self) -> Option<(&str, &str)> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        let text = message.text.as_deref()?;
        let token = self.reply_token.as_deref()?;
        Some((token, text))
    }
}
