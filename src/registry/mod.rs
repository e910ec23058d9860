//! Client registry.
//!
//! Resolves OAuth2 client identifiers within an identity zone.

pub mod client;
pub mod store;

pub use client::ClientRecord;
pub use store::{ClientRegistry, InMemoryClientRegistry, RegistryError};
