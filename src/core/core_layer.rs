// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "media/mod.rs"]
pub mod media;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "proposals/proposal_service.rs"]
pub mod proposals;

#[path = "transport/chat_transport.rs"]
pub mod transport;
