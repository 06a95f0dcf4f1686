//! Core trait abstractions for the pipeline's external collaborators.
//!
//! These traits define the interfaces that applications implement to
//! provide deduplication state, site-specific extraction rules, text
//! quality policy, and output persistence.

pub mod dedup;
pub mod quality;
pub mod rules;
pub mod sink;
