//! In-memory adapters for client persistence and change events.

mod client;

pub use client::{InMemoryClientRepository, InMemoryDocumentStore};
