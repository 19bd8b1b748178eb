//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Platform integrations (LINE, console)
//! - Weather: wttr.in text summary client
//! - LLM: Generative text providers
//! - Server: Webhook HTTP endpoint

pub mod config;
pub mod adapters;
pub mod weather;
pub mod llm;
pub mod server;
