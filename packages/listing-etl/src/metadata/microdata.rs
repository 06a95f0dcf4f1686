//! HTML5 microdata extraction.
//!
//! Every `itemscope` element on the page is one item; a property
//! belongs to the item whose scope is its nearest `itemscope` ancestor,
//! so nested items (a Product's Offer, say) surface as items of their
//! own and re-associate with the record during the per-URL merge.

use scraper::{ElementRef, Html, Selector};

use crate::types::record::RecordPatch;

/// One microdata item: its declared type and flat property list.
#[derive(Debug, Clone)]
pub struct MicrodataItem {
    /// `itemtype` attribute, when declared
    pub item_type: Option<String>,

    /// `(itemprop, value)` pairs in document order
    pub props: Vec<(String, String)>,
}

/// Collect every microdata item on the page.
pub fn items(page: &Html) -> Vec<MicrodataItem> {
    let scope_selector = match Selector::parse("[itemscope]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let prop_selector = match Selector::parse("[itemprop]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    page.select(&scope_selector)
        .map(|scope| MicrodataItem {
            item_type: scope.value().attr("itemtype").map(str::to_string),
            props: scope
                .select(&prop_selector)
                .filter(|prop| belongs_to_scope(*prop, scope))
                .filter_map(|prop| {
                    let name = prop.value().attr("itemprop")?.to_string();
                    let value = prop_value(prop)?;
                    Some((name, value))
                })
                .collect(),
        })
        .collect()
}

/// Map one item onto record fields. Returns None when the item carries
/// nothing usable.
pub fn map_item(item: &MicrodataItem) -> Option<RecordPatch> {
    let mut patch = RecordPatch::new();
    for (name, value) in &item.props {
        match name.as_str() {
            "name" => patch.set_field("name", value.clone()),
            "description" => patch.set_field("description", value.clone()),
            "image" => patch.set_field("image", value.clone()),
            "category" => patch.set_field("category", value.clone()),
            "price" => patch.set_field("price", value.clone()),
            "priceCurrency" => patch.set_field("currency", value.clone()),
            "seller" => patch.set_field("seller", value.clone()),
            "productionDate" => patch.set_field("production_data", value.clone()),
            _ => {}
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// True when `scope` is the property's nearest itemscope ancestor.
fn belongs_to_scope(prop: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    for node in prop.ancestors() {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().attr("itemscope").is_some() {
                return element.id() == scope.id();
            }
        }
    }
    false
}

/// Microdata value rules: attribute for link/media/meta elements, text
/// content otherwise.
fn prop_value(element: ElementRef<'_>) -> Option<String> {
    // A property that opens its own scope is a nested item, not a value.
    if element.value().attr("itemscope").is_some() {
        return None;
    }

    let value = match element.value().name() {
        "meta" => element.value().attr("content").map(str::to_string),
        "img" | "audio" | "video" | "embed" | "iframe" | "source" => {
            element.value().attr("src").map(str::to_string)
        }
        "a" | "area" | "link" => element.value().attr("href").map(str::to_string),
        "time" => element
            .value()
            .attr("datetime")
            .map(str::to_string)
            .or_else(|| Some(element.text().collect::<String>())),
        "data" => element.value().attr("value").map(str::to_string),
        _ => Some(element.text().collect::<String>()),
    };

    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_with_nested_offer() {
        let page = Html::parse_document(
            r#"<div itemscope itemtype="https://schema.org/Product">
                <span itemprop="name">Blue Widget</span>
                <img itemprop="image" src="/widget.jpg">
                <div itemprop="offers" itemscope itemtype="https://schema.org/Offer">
                    <span itemprop="price">19.99</span>
                    <meta itemprop="priceCurrency" content="USD">
                </div>
            </div>"#,
        );

        let found = items(&page);
        assert_eq!(found.len(), 2);

        // Product scope owns name/image but not the nested offer props.
        let product = map_item(&found[0]).unwrap();
        assert_eq!(product.name.as_deref(), Some("Blue Widget"));
        assert_eq!(product.image.as_deref(), Some("/widget.jpg"));
        assert!(product.price.is_none());

        let offer = map_item(&found[1]).unwrap();
        assert_eq!(offer.price.as_deref(), Some("19.99"));
        assert_eq!(offer.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_item_without_mapped_props_is_unusable() {
        let page = Html::parse_document(
            r#"<div itemscope itemtype="https://schema.org/BreadcrumbList">
                <span itemprop="position">1</span>
            </div>"#,
        );
        let found = items(&page);
        assert_eq!(found.len(), 1);
        assert!(map_item(&found[0]).is_none());
    }

    #[test]
    fn test_link_and_meta_values() {
        let page = Html::parse_document(
            r#"<div itemscope>
                <a itemprop="seller" href="/usr/shopkeeper">Shopkeeper</a>
                <meta itemprop="description" content="A fine widget">
            </div>"#,
        );
        let patch = map_item(&items(&page)[0]).unwrap();
        assert_eq!(patch.seller.as_deref(), Some("/usr/shopkeeper"));
        assert_eq!(patch.description.as_deref(), Some("A fine widget"));
    }
}
