// Core media module - classifying inbound content and delivering it back out.

pub mod media_classifier;
pub mod media_delivery;
pub mod media_models;

pub use media_classifier::{classify, derive_text};
pub use media_delivery::{deliver_for_review, publish};
pub use media_models::*;
