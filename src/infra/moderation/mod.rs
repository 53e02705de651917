// Storage backends for submissions and moderators.

#[cfg(test)]
pub mod in_memory;
pub mod sqlite_store;

#[cfg(test)]
pub use in_memory::InMemoryModerationStore;
pub use sqlite_store::SqliteModerationStore;
