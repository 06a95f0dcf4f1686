//! Data types for the listing extraction pipeline.

pub mod document;
pub mod record;
pub mod report;
