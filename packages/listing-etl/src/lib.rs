//! Listing Extraction Pipeline
//!
//! A per-document extraction-and-merge pipeline for crawled listing
//! pages: decode the raw payload, gate out low-value and duplicate
//! text, extract structured fields from every source the page offers,
//! merge per url under a fixed precedence, and normalize the result
//! into canonical output rows.
//!
//! # Design Philosophy
//!
//! **"Drop the document, never the batch"**
//!
//! - Per-document failures degrade to counters and diagnostics
//! - Per-source failures degrade to a missing contribution
//! - Only external collaborators (filter backend, sink) can fail a run
//! - The merge is a pure fold; extraction sources stay independent
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use listing_etl::{BatchConfig, Pipeline};
//! use listing_etl::stores::{MemoryDedupFilter, MemoryRuleStore, MemorySink};
//! use listing_etl::traits::quality::MinLengthQuality;
//!
//! let sink = Arc::new(MemorySink::new());
//! let pipeline = Pipeline::new(
//!     Arc::new(MinLengthQuality::default()),
//!     Arc::new(MemoryDedupFilter::new()),
//!     Arc::new(MemoryRuleStore::new()),
//!     Arc::clone(&sink),
//! );
//! let report = pipeline.run(documents, &BatchConfig::default()).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator contracts (DedupFilter, RuleStore, RecordSink)
//! - [`types`] - Documents, records, and batch reports
//! - [`decode`] - Base64 payload decoding with encoding fallback
//! - [`text`] - Page title and visible-text extraction
//! - [`metadata`] - Embedded metadata syntaxes (microdata, Open Graph,
//!   Dublin Core, JSON-LD)
//! - [`pipeline`] - Extraction, merge, normalization, batch loop
//! - [`stores`] - In-memory collaborator implementations
//! - [`testing`] - Mock collaborators for testing

pub mod decode;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{DecodeError, EtlError, SourceError};
pub use pipeline::{BatchConfig, Pipeline};
pub use traits::{
    dedup::{DedupFilter, DedupGate, GateDecision, NoopDedupFilter},
    quality::{MinLengthQuality, TextQuality},
    rules::{NoopRuleStore, RuleStore, SiteRule},
    sink::RecordSink,
};
pub use types::{
    document::{DecodedDocument, RawDocument},
    record::{FieldSource, ListingRecord, PartialRecord, RecordPatch, SourcedRecord},
    report::{BatchReport, Diagnostic},
};
