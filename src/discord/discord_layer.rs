// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod moderation;

// Re-export command types for convenience
pub use commands::suggestions::{Data, Error};
