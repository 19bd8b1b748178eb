//! Domain entities - Request-scoped objects, nothing here outlives one webhook call

pub mod source;
pub mod event;
pub mod command;

pub use source::EventSource;
pub use event::{InboundEvent, EventMessage, WebhookPayload};
pub use command::{Command, Route};
