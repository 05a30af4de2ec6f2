//! Document store boundary for weft
//!
//! Sessions talk to a store only through `DocumentStore`: one upsert that
//! returns the post-write document, an ordered bulk upsert, and pipeline
//! aggregation. The store handle is injected; there is no global client.
//!
//! `MemoryStore` is the reference implementation. It evaluates filters,
//! sorts and paging stages over JSON documents and applies the three
//! update clauses, which is enough to exercise every command this crate
//! produces.

mod backend;
mod errors;
mod matcher;
mod memory;
mod sorter;

pub use backend::{BulkWriteSummary, DocumentStore, UpsertOperation};
pub use errors::{StoreError, StoreResult};
pub use matcher::DocumentMatcher;
pub use memory::MemoryStore;
pub use sorter::DocumentSorter;
