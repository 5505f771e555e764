//! Karma Core - Domain models, event extraction, and storage traits.
//!
//! This crate contains the pure domain logic of the karma bot. It has no
//! dependencies on other karma crates and performs no I/O.

pub mod error;
pub mod event;
pub mod extract;
pub mod karma;
pub mod store;

// Re-exports for convenience
pub use error::{ExtractError, StoreError};
pub use event::{Block, InboundEvent, MessageEvent, RichTextElement, Segment};
pub use extract::extract;
pub use karma::Karma;
pub use store::CounterStore;

#[cfg(any(test, feature = "test-utils"))]
pub use store::memory::InMemoryCounterStore;
