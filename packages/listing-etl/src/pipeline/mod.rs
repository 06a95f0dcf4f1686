//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Structured extraction (base, marketplace, site-rule, embedded metadata)
//! - Per-url merge with fixed source precedence
//! - Field normalization (price, currency, mojibake repair)
//! - The concurrent batch run loop around all of it

pub mod batch;
pub mod extract;
pub mod merge;
pub mod normalize;

pub use batch::{BatchConfig, Pipeline};
pub use extract::{extract_document, ExtractOutcome};
pub use merge::merge_records;
pub use normalize::{fix_currency, fix_price, fix_text, normalize_records};
