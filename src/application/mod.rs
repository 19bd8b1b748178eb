//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Messaging: Gatekeeping, command normalization, routing
//! - Services: Reply producers and per-event orchestration

pub mod errors;
pub mod messaging;
pub mod services;
