// Core moderation module - submissions, moderators, the review queue and
// decisions. Storage and transport are ports implemented elsewhere.

pub mod access_gate;
pub mod admin_service;
pub mod moderation_models;
pub mod moderation_service;
pub mod moderation_store;

#[cfg(test)]
pub mod test_support;

pub use access_gate::*;
pub use admin_service::*;
pub use moderation_models::*;
pub use moderation_service::*;
pub use moderation_store::*;
