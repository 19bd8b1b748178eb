use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an inbound event came from: a 1:1 chat, a group, or a multi-person room
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl EventSource {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            source_type: "user".to_string(),
            user_id: Some(id.into()),
            group_id: None,
            room_id: None,
        }
    }

    pub fn group(group_id: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            source_type: "group".to_string(),
            user_id,
            group_id: Some(group_id.into()),
            room_id: None,
        }
    }

    /// Identifier of the conversation the event belongs to
    pub fn chat_id(&self) -> &str {
        self.group_id
            .as_deref()
            .or(self.room_id.as_deref())
            .or(self.user_id.as_deref())
            .unwrap_or("unknown")
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.chat_id())
    }
}
