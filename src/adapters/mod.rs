//! Adapters - implementations of the ports.
//!
//! - `events` - in-memory change bus

pub mod events;

pub use events::InMemoryChangeBus;
