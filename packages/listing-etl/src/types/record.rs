//! Record types - partial per-source field sets and the merged listing row.
//!
//! Every extraction source contributes a [`PartialRecord`]; the merger
//! reduces all partials sharing a url into one, and the normalizer turns
//! that into the final [`ListingRecord`] output row.

use serde::{Deserialize, Serialize};

/// Extraction source of a partial record, in merge-precedence order.
///
/// Smaller discriminant wins: during the merge an earlier source's
/// non-null field is never overridden by a later source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Title/text/domain/retrieved built from the page itself
    Base,
    /// Marketplace-specific page-structure extraction (eBay seller card)
    Marketplace,
    /// Registered per-domain extraction rule
    SiteRule,
    /// HTML5 microdata items
    Microdata,
    /// Open Graph meta tags
    OpenGraph,
    /// Dublin Core meta tags
    DublinCore,
    /// JSON-LD blocks of type Product
    JsonLd,
}

impl FieldSource {
    /// All sources in merge-precedence order.
    pub const ORDER: [FieldSource; 7] = [
        FieldSource::Base,
        FieldSource::Marketplace,
        FieldSource::SiteRule,
        FieldSource::Microdata,
        FieldSource::OpenGraph,
        FieldSource::DublinCore,
        FieldSource::JsonLd,
    ];

    /// Short name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            FieldSource::Base => "base",
            FieldSource::Marketplace => "marketplace",
            FieldSource::SiteRule => "site-rule",
            FieldSource::Microdata => "microdata",
            FieldSource::OpenGraph => "opengraph",
            FieldSource::DublinCore => "dublincore",
            FieldSource::JsonLd => "json-ld",
        }
    }
}

/// Canonical column order for tabular output.
pub const COLUMNS: [&str; 17] = [
    "url",
    "title",
    "text",
    "domain",
    "retrieved",
    "name",
    "description",
    "image",
    "production_data",
    "category",
    "price",
    "currency",
    "seller",
    "seller_type",
    "seller_url",
    "location",
    "ships to",
];

/// One source's contribution for one document, pre-normalization.
///
/// `url` is always present and non-empty; every other field is either a
/// value or explicitly absent, never an empty string standing in for
/// absence. `price` is still the raw free-text representation here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub domain: Option<String>,
    pub retrieved: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub production_data: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub seller: Option<String>,
    pub seller_type: Option<String>,
    pub seller_url: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "ships to")]
    pub ships_to: Option<String>,
}

impl PartialRecord {
    /// Create the base field set for a document: page-derived fields
    /// populated, all commerce fields absent.
    pub fn base(
        url: impl Into<String>,
        title: Option<String>,
        text: Option<String>,
        domain: Option<String>,
        retrieved: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title,
            text,
            domain,
            retrieved,
            ..Default::default()
        }
    }

    /// Overlay a patch: every present patch field replaces this record's.
    pub fn apply(&mut self, patch: RecordPatch) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if patch.$field.is_some() {
                    self.$field = patch.$field;
                })*
            };
        }
        overlay!(
            title,
            name,
            description,
            image,
            production_data,
            category,
            price,
            currency,
            seller,
            seller_type,
            seller_url,
            location,
            ships_to,
        );
    }

    /// Fill every absent field from `other`, never replacing a present one.
    pub fn fill_from(&mut self, other: &PartialRecord) {
        macro_rules! take_first {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_none() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take_first!(
            title,
            text,
            domain,
            retrieved,
            name,
            description,
            image,
            production_data,
            category,
            price,
            currency,
            seller,
            seller_type,
            seller_url,
            location,
            ships_to,
        );
    }
}

/// A partial record tagged with the source that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcedRecord {
    /// Which extraction source produced this contribution
    pub source: FieldSource,

    /// The contributed fields
    pub record: PartialRecord,
}

impl SourcedRecord {
    /// Tag a partial record with its source.
    pub fn new(source: FieldSource, record: PartialRecord) -> Self {
        Self { source, record }
    }
}

/// Fields a single extraction source may contribute on top of the base
/// set. Absent fields mean "nothing usable extracted", not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub production_data: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub seller: Option<String>,
    pub seller_type: Option<String>,
    pub seller_url: Option<String>,
    pub location: Option<String>,
    pub ships_to: Option<String>,
}

impl RecordPatch {
    /// A patch with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set a field by its canonical column name. Unknown names are
    /// ignored so data-driven rules can carry extra keys harmlessly.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        match field {
            "title" => self.title = Some(value),
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "image" => self.image = Some(value),
            "production_data" => self.production_data = Some(value),
            "category" => self.category = Some(value),
            "price" => self.price = Some(value),
            "currency" => self.currency = Some(value),
            "seller" => self.seller = Some(value),
            "seller_type" => self.seller_type = Some(value),
            "seller_url" => self.seller_url = Some(value),
            "location" => self.location = Some(value),
            "ships_to" | "ships to" => self.ships_to = Some(value),
            _ => {}
        }
    }
}

/// The final canonical output row: one per distinct url, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub domain: Option<String>,
    pub retrieved: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub production_data: Option<String>,
    pub category: Option<String>,
    /// Parsed numeric price; None when the raw value was unparseable
    pub price: Option<f64>,
    /// Canonical ISO 4217 currency code
    pub currency: Option<String>,
    pub seller: Option<String>,
    pub seller_type: Option<String>,
    pub seller_url: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "ships to")]
    pub ships_to: Option<String>,
}
