//! Structured extraction - partial field sets from every source a
//! document offers.
//!
//! Sources are emitted in fixed precedence order: the base set always
//! comes first, then the marketplace set when the domain matches, then
//! the site-rule set when a rule is registered, then the embedded
//! metadata syntaxes. Any single source's failure is caught here,
//! logged, and downgraded to a diagnostic - it never costs the document
//! its other contributions.

use scraper::{Html, Selector};
use tracing::warn;

use crate::error::SourceError;
use crate::metadata;
use crate::traits::rules::SiteRule;
use crate::types::document::DecodedDocument;
use crate::types::record::{FieldSource, PartialRecord, RecordPatch, SourcedRecord};
use crate::types::report::Diagnostic;

/// One document's extraction output.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    /// Partial records in source order, base set first
    pub partials: Vec<SourcedRecord>,

    /// Caught per-source failures
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract every partial field set a decoded document offers.
///
/// `text` and `title` come from the text-extraction pass; `rule` is the
/// pre-loaded site rule for the document's domain, when one exists.
pub fn extract_document(
    doc: &DecodedDocument,
    text: Option<String>,
    title: Option<String>,
    rule: Option<&dyn SiteRule>,
) -> ExtractOutcome {
    let page = Html::parse_document(&doc.html);
    let base = PartialRecord::base(&doc.url, title, text, doc.domain(), doc.retrieved());

    let mut outcome = ExtractOutcome::default();
    outcome
        .partials
        .push(SourcedRecord::new(FieldSource::Base, base.clone()));

    if let Some(domain) = base.domain.as_deref() {
        // Substring match on the first domain label, kept as its own
        // page-structure extractor rather than a data-driven rule.
        let label = domain.split('.').next().unwrap_or(domain);
        if label.contains("ebay") {
            if let Some(patch) = marketplace_patch(&page) {
                let mut record = base.clone();
                record.apply(patch);
                outcome
                    .partials
                    .push(SourcedRecord::new(FieldSource::Marketplace, record));
            }
        }
    }

    if let Some(rule) = rule {
        match rule.apply(&page) {
            Ok(fields) => {
                let mut patch = RecordPatch::new();
                for (field, value) in fields {
                    // Rule sets name the product field "product".
                    if field == "product" {
                        patch.set_field("name", value);
                    } else {
                        patch.set_field(&field, value);
                    }
                }
                if !patch.is_empty() {
                    let mut record = base.clone();
                    record.apply(patch);
                    outcome
                        .partials
                        .push(SourcedRecord::new(FieldSource::SiteRule, record));
                }
            }
            Err(err) => {
                let err = SourceError::SiteRule {
                    domain: base.domain.clone().unwrap_or_default(),
                    source: err,
                };
                warn!(url = %doc.url, %err, "site rule contributed nothing");
                outcome
                    .diagnostics
                    .push(Diagnostic::source(&doc.url, FieldSource::SiteRule, err.to_string()));
            }
        }
    }

    let scan = metadata::extract_embedded(&page);
    for err in scan.errors {
        warn!(url = %doc.url, %err, "embedded metadata failure");
        outcome
            .diagnostics
            .push(Diagnostic::source(&doc.url, FieldSource::JsonLd, err.to_string()));
    }
    for (source, patch) in scan.patches {
        let mut record = base.clone();
        record.apply(patch);
        outcome.partials.push(SourcedRecord::new(source, record));
    }

    outcome
}

/// Seller fields from the eBay seller card, best-effort.
fn marketplace_patch(page: &Html) -> Option<RecordPatch> {
    let mut patch = RecordPatch::new();

    if let Ok(selector) = Selector::parse("a[href*='/usr/']") {
        if let Some(link) = page.select(&selector).next() {
            let seller = link.text().collect::<String>().trim().to_string();
            patch.set_field("seller", seller);
            if let Some(href) = link.value().attr("href") {
                patch.set_field("seller_url", href);
            }
        }
    }

    if patch.seller.is_none() {
        // Older seller-badge markup.
        if let Ok(selector) = Selector::parse("span.mbg-nw") {
            if let Some(badge) = page.select(&selector).next() {
                patch.set_field("seller", badge.text().collect::<String>().trim().to_string());
            }
        }
    }

    if patch.seller.is_none() {
        return None;
    }
    patch.set_field("seller_type", "marketplace");
    Some(patch)
}
