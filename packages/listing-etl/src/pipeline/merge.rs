//! Per-URL merge - reduce all partial records sharing a url into one.
//!
//! Grouping is insertion-ordered so a batch always produces records in
//! a deterministic order, and the reduction is first-non-null per field
//! visited in extraction-source order: later sources never override an
//! already-present field. Nothing is dropped silently - a url with only
//! a base set still yields a record.

use indexmap::IndexMap;

use crate::types::record::{PartialRecord, SourcedRecord};

/// Merge a batch's partial records into one record per distinct url.
pub fn merge_records(partials: Vec<SourcedRecord>) -> Vec<PartialRecord> {
    let mut groups: IndexMap<String, Vec<SourcedRecord>> = IndexMap::new();
    for sourced in partials {
        groups
            .entry(sourced.record.url.clone())
            .or_default()
            .push(sourced);
    }

    groups
        .into_values()
        .map(|mut group| {
            // Stable sort: source precedence first, document order for
            // contributions from the same source.
            group.sort_by_key(|sourced| sourced.source);
            let mut iter = group.into_iter();
            let mut merged = match iter.next() {
                Some(first) => first.record,
                None => return PartialRecord::default(),
            };
            for sourced in iter {
                merged.fill_from(&sourced.record);
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::FieldSource;

    fn partial(url: &str, source: FieldSource, price: Option<&str>) -> SourcedRecord {
        SourcedRecord::new(
            source,
            PartialRecord {
                url: url.to_string(),
                price: price.map(str::to_string),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_earlier_source_wins() {
        let merged = merge_records(vec![
            partial("u", FieldSource::Base, None),
            partial("u", FieldSource::SiteRule, Some("19.99")),
            partial("u", FieldSource::Microdata, Some("9.99")),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].price.as_deref(), Some("19.99"));
    }

    #[test]
    fn test_source_order_beats_arrival_order() {
        // Microdata arrives before the site rule; the site rule still wins.
        let merged = merge_records(vec![
            partial("u", FieldSource::Microdata, Some("9.99")),
            partial("u", FieldSource::SiteRule, Some("19.99")),
        ]);
        assert_eq!(merged[0].price.as_deref(), Some("19.99"));
    }

    #[test]
    fn test_one_record_per_url_nothing_lost() {
        let with_seller = PartialRecord {
            url: "u".to_string(),
            seller: Some("shop".to_string()),
            ..Default::default()
        };

        let merged = merge_records(vec![
            partial("u", FieldSource::Base, None),
            SourcedRecord::new(FieldSource::Marketplace, with_seller),
            partial("u", FieldSource::JsonLd, Some("5.00")),
            partial("v", FieldSource::Base, None),
        ]);

        assert_eq!(merged.len(), 2);
        let u = merged.iter().find(|r| r.url == "u").unwrap();
        assert_eq!(u.seller.as_deref(), Some("shop"));
        assert_eq!(u.price.as_deref(), Some("5.00"));
    }

    #[test]
    fn test_base_only_url_still_emits() {
        let merged = merge_records(vec![partial("u", FieldSource::Base, None)]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].price.is_none());
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let merged = merge_records(vec![
            partial("b", FieldSource::Base, None),
            partial("a", FieldSource::Base, None),
            partial("b", FieldSource::JsonLd, Some("1.00")),
        ]);
        let urls: Vec<_> = merged.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a"]);
    }
}
