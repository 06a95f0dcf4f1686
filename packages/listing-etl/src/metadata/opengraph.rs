//! Open Graph extraction.
//!
//! A page carries at most one Open Graph description of itself, so only
//! the first (and only) item is mapped.

use scraper::{Html, Selector};

use crate::types::record::RecordPatch;

/// The page's Open Graph property set: `(property, content)` pairs in
/// document order. None when the page declares no `og:`/`product:`
/// properties at all.
pub fn first_item(page: &Html) -> Option<Vec<(String, String)>> {
    let selector = Selector::parse("meta[property][content]").ok()?;

    let props: Vec<(String, String)> = page
        .select(&selector)
        .filter_map(|meta| {
            let property = meta.value().attr("property")?;
            if !property.starts_with("og:") && !property.starts_with("product:") {
                return None;
            }
            let content = meta.value().attr("content")?.trim();
            if content.is_empty() {
                return None;
            }
            Some((property.to_string(), content.to_string()))
        })
        .collect();

    if props.is_empty() {
        None
    } else {
        Some(props)
    }
}

/// Map the Open Graph property set onto record fields.
pub fn map_item(props: &[(String, String)]) -> Option<RecordPatch> {
    let mut patch = RecordPatch::new();
    for (property, content) in props {
        match property.as_str() {
            "og:title" => patch.set_field("name", content.clone()),
            "og:description" => patch.set_field("description", content.clone()),
            "og:image" => patch.set_field("image", content.clone()),
            "og:price:amount" | "product:price:amount" => {
                patch.set_field("price", content.clone())
            }
            "og:price:currency" | "product:price:currency" => {
                patch.set_field("currency", content.clone())
            }
            _ => {}
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_product_page() {
        let page = Html::parse_document(
            r#"<head>
                <meta property="og:title" content="Blue Widget">
                <meta property="og:image" content="https://cdn.example.com/widget.jpg">
                <meta property="product:price:amount" content="19.99">
                <meta property="product:price:currency" content="USD">
                <meta property="unrelated" content="ignored">
            </head>"#,
        );

        let patch = map_item(&first_item(&page).unwrap()).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Blue Widget"));
        assert_eq!(
            patch.image.as_deref(),
            Some("https://cdn.example.com/widget.jpg")
        );
        assert_eq!(patch.price.as_deref(), Some("19.99"));
        assert_eq!(patch.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_page_without_og_tags() {
        let page = Html::parse_document(r#"<head><meta name="viewport" content="x"></head>"#);
        assert!(first_item(&page).is_none());
    }

    #[test]
    fn test_duplicate_property_last_wins_within_item() {
        let page = Html::parse_document(
            r#"<head>
                <meta property="og:title" content="First">
                <meta property="og:title" content="Second">
            </head>"#,
        );
        let patch = map_item(&first_item(&page).unwrap()).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Second"));
    }
}
