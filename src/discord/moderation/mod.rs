// Discord side of the suggestion box: the serenity transport and event translation.

pub mod events;
pub mod transport;

pub use transport::SerenityTransport;
