//! Application services - Reply production and per-event orchestration

pub mod reply_service;
pub mod message_service;

pub use reply_service::ReplyService;
pub use message_service::{MessageService, EventOutcome};
