//! Storage layer for the subscriber data repository.
//!
//! The repository never owns persistence: documents live in an external
//! store reached through [`DocumentStore`]. This crate defines that contract
//! and ships [`MemoryDocumentStore`], a lock-guarded reference implementation.
//!
//! # Architecture
//!
//! - Documents are JSON objects grouped by collection name
//! - [`StoreFilter`] selects documents by top-level equalities and nested
//!   key existence
//! - Merge patches follow RFC 7396, structural patches RFC 6902

mod error;
mod filter;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use filter::StoreFilter;
pub use memory::MemoryDocumentStore;
pub use store::DocumentStore;
