//! Platform adapters - Where replies are delivered

pub mod line;
pub mod console;

pub use line::LineAdapter;
pub use console::ConsoleAdapter;
