//! tczc-bot - LINE webhook responder for the TCZC car club
//!
//! Inbound text is gatekept, normalized into a canonical command and routed
//! to one of: a fixed club answer, a wttr.in weather lookup, or a Gemini
//! completion. Replies go back through the LINE reply API.

pub mod domain;
pub mod application;
pub mod infrastructure;
