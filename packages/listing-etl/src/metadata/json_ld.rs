//! JSON-LD extraction.
//!
//! Only items whose declared `@type` is `Product` are mapped, one
//! partial record per item. `@graph` containers, top-level arrays, and
//! namespaced types (`schema:Product`) are all flattened first.

use scraper::{Html, Selector};
use serde_json::Value;

use crate::types::record::RecordPatch;

/// Result of scanning a page's JSON-LD blocks.
#[derive(Debug, Default)]
pub struct Scan {
    /// Product-typed items, flattened
    pub items: Vec<Value>,

    /// Parse failures, one per broken script block
    pub errors: Vec<String>,
}

/// Collect every Product-typed JSON-LD item on the page.
///
/// Script blocks that fail to parse as JSON are reported but skipped; a
/// broken block never costs the page its other blocks.
pub fn scan(page: &Html) -> Scan {
    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(selector) => selector,
        Err(_) => return Scan::default(),
    };

    let mut scan = Scan::default();
    for script in page.select(&selector) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(json) => flatten(&json, &mut scan.items),
            Err(err) => scan.errors.push(err.to_string()),
        }
    }
    scan
}

/// Map one Product item onto record fields.
pub fn map_item(item: &Value) -> Option<RecordPatch> {
    let mut patch = RecordPatch::new();

    if let Some(name) = string_value(item.get("name")) {
        patch.set_field("name", name);
    }
    if let Some(description) = string_value(item.get("description")) {
        patch.set_field("description", description);
    }
    if let Some(image) = image_value(item.get("image")) {
        patch.set_field("image", image);
    }
    if let Some(category) = string_value(item.get("category")) {
        patch.set_field("category", category);
    }
    if let Some(date) = string_value(item.get("productionDate")) {
        patch.set_field("production_data", date);
    }

    if let Some(offer) = first_offer(item.get("offers")) {
        if let Some(price) = string_value(offer.get("price")) {
            patch.set_field("price", price);
        }
        if let Some(currency) = string_value(offer.get("priceCurrency")) {
            patch.set_field("currency", currency);
        }
        if let Some(seller) = offer.get("seller") {
            if let Some(name) = string_value(seller.get("name")).or_else(|| string_value(Some(seller))) {
                patch.set_field("seller", name);
            }
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// Flatten `@graph` containers and arrays into Product items.
fn flatten(json: &Value, items: &mut Vec<Value>) {
    match json {
        Value::Object(map) => {
            if let Some(Value::Array(graph)) = map.get("@graph") {
                for entry in graph {
                    flatten(entry, items);
                }
            } else if is_product(json) {
                items.push(json.clone());
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                flatten(entry, items);
            }
        }
        _ => {}
    }
}

/// Whether the item declares `@type` Product, namespace-insensitively.
fn is_product(item: &Value) -> bool {
    fn matches(type_name: &str) -> bool {
        type_name.rsplit(':').next().unwrap_or(type_name) == "Product"
    }

    match item.get("@type") {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(types)) => types
            .iter()
            .any(|t| t.as_str().is_some_and(matches)),
        _ => false,
    }
}

/// First offer, whether `offers` is an object or an array.
fn first_offer(offers: Option<&Value>) -> Option<&Value> {
    match offers? {
        Value::Object(_) => offers,
        Value::Array(entries) => entries.first(),
        _ => None,
    }
}

/// Scalar rendering of a JSON value: strings as-is, numbers formatted.
fn string_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Image field: a URL string, the first of an array, or an ImageObject.
fn image_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => image_value(entries.first()),
        Value::Object(map) => string_value(map.get("url")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(block: &str) -> Html {
        Html::parse_document(&format!(
            r#"<head><script type="application/ld+json">{block}</script></head>"#
        ))
    }

    #[test]
    fn test_product_item_is_mapped() {
        let page = page_with(
            r#"{
                "@type": "Product",
                "name": "Blue Widget",
                "description": "A widget, but blue",
                "image": ["https://cdn.example.com/w.jpg"],
                "offers": {"price": 19.99, "priceCurrency": "USD", "seller": {"name": "Widgets Inc"}}
            }"#,
        );

        let items = scan(&page).items;
        assert_eq!(items.len(), 1);

        let patch = map_item(&items[0]).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Blue Widget"));
        assert_eq!(patch.image.as_deref(), Some("https://cdn.example.com/w.jpg"));
        assert_eq!(patch.price.as_deref(), Some("19.99"));
        assert_eq!(patch.currency.as_deref(), Some("USD"));
        assert_eq!(patch.seller.as_deref(), Some("Widgets Inc"));
    }

    #[test]
    fn test_article_contributes_nothing() {
        let page = page_with(r#"{"@type": "Article", "name": "A story"}"#);
        assert!(scan(&page).items.is_empty());
    }

    #[test]
    fn test_graph_and_namespaced_types() {
        let page = page_with(
            r#"{"@graph": [
                {"@type": "WebPage", "name": "Page"},
                {"@type": "schema:Product", "name": "Graph Widget"}
            ]}"#,
        );

        let items = scan(&page).items;
        assert_eq!(items.len(), 1);
        assert_eq!(
            map_item(&items[0]).unwrap().name.as_deref(),
            Some("Graph Widget")
        );
    }

    #[test]
    fn test_broken_block_does_not_poison_others() {
        let page = Html::parse_document(
            r#"<head>
                <script type="application/ld+json">{not json</script>
                <script type="application/ld+json">{"@type": "Product", "name": "Ok"}</script>
            </head>"#,
        );
        let scanned = scan(&page);
        assert_eq!(scanned.items.len(), 1);
        assert_eq!(scanned.errors.len(), 1);
    }
}
