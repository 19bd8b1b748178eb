//! Domain layer - Core chat-routing concepts with no outbound I/O
//! 
//! This layer contains:
//! - Entities: Inbound events, canonical commands, routes
//! - Traits: Abstractions for the messaging platform and weather service

pub mod entities;
pub mod traits;
