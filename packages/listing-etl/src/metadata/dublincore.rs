//! Dublin Core extraction.
//!
//! Like Open Graph, a page describes itself once; only the first item
//! is mapped.

use scraper::{Html, Selector};

use crate::types::record::RecordPatch;

/// The page's Dublin Core element set: `(element, content)` pairs with
/// the `DC.`/`DCTERMS.` prefix stripped and lowercased. None when the
/// page declares no Dublin Core metadata.
pub fn first_item(page: &Html) -> Option<Vec<(String, String)>> {
    let selector = Selector::parse("meta[name][content]").ok()?;

    let elements: Vec<(String, String)> = page
        .select(&selector)
        .filter_map(|meta| {
            let name = meta.value().attr("name")?.to_ascii_lowercase();
            let element = name
                .strip_prefix("dc.")
                .or_else(|| name.strip_prefix("dcterms."))?;
            let content = meta.value().attr("content")?.trim();
            if content.is_empty() {
                return None;
            }
            Some((element.to_string(), content.to_string()))
        })
        .collect();

    if elements.is_empty() {
        None
    } else {
        Some(elements)
    }
}

/// Map the Dublin Core element set onto record fields.
pub fn map_item(elements: &[(String, String)]) -> Option<RecordPatch> {
    let mut patch = RecordPatch::new();
    for (element, content) in elements {
        match element.as_str() {
            "title" => patch.set_field("name", content.clone()),
            "description" => patch.set_field("description", content.clone()),
            "subject" => patch.set_field("category", content.clone()),
            "date" => patch.set_field("production_data", content.clone()),
            _ => {}
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}
