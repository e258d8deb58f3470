//! Impls - in-process implementations of the ports.
//!
//! - **InMemoryStore**: a Redux-style host store for demos and tests
//! - **CapturingSink**: an unhandled sink that records payloads

pub mod capturing_sink;
pub mod memory_store;

pub use self::capturing_sink::CapturingSink;
pub use self::memory_store::InMemoryStore;
