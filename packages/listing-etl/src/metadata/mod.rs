//! Embedded-metadata syntaxes (JSON-LD, microdata, Open Graph, Dublin
//! Core) as a fixed variant set.
//!
//! Each syntax module exposes a mapping function with the same shape -
//! raw syntax item in, `Option<RecordPatch>` out - and the extractor
//! iterates the variants in the fixed priority order instead of relying
//! on runtime type inspection. `None` means "nothing usable extracted",
//! not an error.

pub mod dublincore;
pub mod json_ld;
pub mod microdata;
pub mod opengraph;

use scraper::Html;

use crate::error::SourceError;
use crate::types::record::{FieldSource, RecordPatch};

/// Everything the embedded syntaxes produced for one page.
#[derive(Debug, Default)]
pub struct EmbeddedScan {
    /// Usable contributions in priority order
    pub patches: Vec<(FieldSource, RecordPatch)>,

    /// Caught per-syntax failures; the page's other syntaxes still flow
    pub errors: Vec<SourceError>,
}

/// Run every embedded syntax over a parsed page, in priority order:
/// microdata (every item), Open Graph (first item), Dublin Core (first
/// item), JSON-LD (Product items only).
pub fn extract_embedded(page: &Html) -> EmbeddedScan {
    let mut scan = EmbeddedScan::default();

    for item in microdata::items(page) {
        if let Some(patch) = microdata::map_item(&item) {
            scan.patches.push((FieldSource::Microdata, patch));
        }
    }

    if let Some(item) = opengraph::first_item(page) {
        if let Some(patch) = opengraph::map_item(&item) {
            scan.patches.push((FieldSource::OpenGraph, patch));
        }
    }

    if let Some(item) = dublincore::first_item(page) {
        if let Some(patch) = dublincore::map_item(&item) {
            scan.patches.push((FieldSource::DublinCore, patch));
        }
    }

    let json_ld_scan = json_ld::scan(page);
    for message in json_ld_scan.errors {
        scan.errors.push(SourceError::Metadata {
            syntax: "json-ld",
            message,
        });
    }
    for item in json_ld_scan.items {
        if let Some(patch) = json_ld::map_item(&item) {
            scan.patches.push((FieldSource::JsonLd, patch));
        }
    }

    scan
}
