//! Collaborator implementations bundled with the library.
//!
//! Available backends:
//! - `MemoryDedupFilter` - in-memory exact-match dedup state
//! - `MemoryRuleStore` / `SelectorRule` - in-memory rule registry
//! - `MemorySink` - in-memory output table
//!
//! Production deployments supply their own implementations of the
//! traits in [`crate::traits`].

pub mod memory;

pub use memory::{MemoryDedupFilter, MemoryRuleStore, MemorySink, SelectorRule};
