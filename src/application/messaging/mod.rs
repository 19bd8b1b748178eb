//! Message handling - Gatekeeping, normalization and routing of inbound text

pub mod gatekeeper;
pub mod parser;
pub mod dispatcher;

pub use gatekeeper::Gatekeeper;
pub use parser::MessageParser;
pub use dispatcher::MessageDispatcher;
