//! Field normalization over the merged record set.
//!
//! Three independent, order-insensitive, total rules: free-text prices
//! parse to a number or null, currency tokens map to an ISO code or
//! null, and the text fields get a mojibake repair pass. None of them
//! ever fails - bad input normalizes to null or passes through.

use regex::Regex;

use crate::types::record::{ListingRecord, PartialRecord};

/// Normalize a merged record set into the final output rows.
pub fn normalize_records(merged: Vec<PartialRecord>) -> Vec<ListingRecord> {
    merged.into_iter().map(normalize_record).collect()
}

fn normalize_record(record: PartialRecord) -> ListingRecord {
    ListingRecord {
        url: record.url,
        title: record.title.map(|v| fix_text(&v)),
        text: record.text.map(|v| fix_text(&v)),
        domain: record.domain,
        retrieved: record.retrieved,
        name: record.name.map(|v| fix_text(&v)),
        description: record.description.map(|v| fix_text(&v)),
        image: record.image,
        production_data: record.production_data,
        category: record.category,
        price: record.price.as_deref().and_then(fix_price),
        currency: record
            .currency
            .as_deref()
            .and_then(fix_currency)
            .map(str::to_string),
        seller: record.seller,
        seller_type: record.seller_type,
        seller_url: record.seller_url,
        location: record.location,
        ships_to: record.ships_to,
    }
}

/// Parse a free-text price into a number. Handles currency symbols,
/// grouping separators, and both `1,234.56` and `1.234,56` forms.
pub fn fix_price(raw: &str) -> Option<f64> {
    let digits = Regex::new(r"[0-9][0-9.,\u{a0} ]*").unwrap();
    let token: String = digits
        .find(raw)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let token = token.trim_end_matches(['.', ',']);

    let normalized = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => token.replace(',', ""),
        (Some(_), Some(_)) => {
            let without_grouping = token.replace('.', "");
            without_grouping.replacen(',', ".", 1)
        }
        (None, Some(_)) => {
            let fractional = token.rsplit(',').next().unwrap_or_default();
            if token.matches(',').count() == 1 && fractional.len() != 3 {
                token.replacen(',', ".", 1)
            } else {
                token.replace(',', "")
            }
        }
        (Some(_), None) if token.matches('.').count() > 1 => token.replace('.', ""),
        _ => token.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map a raw currency token or symbol to a canonical ISO-ish code.
pub fn fix_currency(raw: &str) -> Option<&'static str> {
    for (symbol, code) in [
        ('€', "EUR"),
        ('£', "GBP"),
        ('¥', "JPY"),
        ('₽', "RUB"),
    ] {
        if raw.contains(symbol) {
            return Some(code);
        }
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_ascii_uppercase();

    match cleaned.as_str() {
        "$" | "US$" | "USD" => Some("USD"),
        "EUR" | "EURO" | "EUROS" => Some("EUR"),
        "GBP" => Some("GBP"),
        "JPY" | "YEN" => Some("JPY"),
        "C$" | "CA$" | "CAD" => Some("CAD"),
        "A$" | "AU$" | "AUD" => Some("AUD"),
        "RUB" => Some("RUB"),
        "BTC" | "XBT" => Some("BTC"),
        "XMR" => Some("XMR"),
        _ => None,
    }
}

/// Repair classic double-encoded text (UTF-8 read as windows-1252).
/// Clean text passes through unchanged.
pub fn fix_text(raw: &str) -> String {
    let mut current = raw.to_string();
    // Double encoding can stack; two unwinds cover text mangled twice.
    for _ in 0..2 {
        if !looks_mangled(&current) {
            break;
        }
        match unwind_double_encoding(&current) {
            Some(fixed) if fixed != current => current = fixed,
            _ => break,
        }
    }
    current
}

fn looks_mangled(text: &str) -> bool {
    text.contains('Ã') || text.contains("â€") || text.contains('Â')
}

fn unwind_double_encoding(text: &str) -> Option<String> {
    let (bytes, _, had_unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    if had_unmappable {
        return None;
    }
    String::from_utf8(bytes.into_owned()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fix_price_plain_and_symboled() {
        assert_eq!(fix_price("19.99"), Some(19.99));
        assert_eq!(fix_price("$ 19.99"), Some(19.99));
        assert_eq!(fix_price("USD 1,234.56"), Some(1234.56));
        assert_eq!(fix_price("1.234,56 €"), Some(1234.56));
        assert_eq!(fix_price("19,99"), Some(19.99));
        assert_eq!(fix_price("1,234"), Some(1234.0));
        assert_eq!(fix_price("1.234.567"), Some(1234567.0));
        assert_eq!(fix_price("42"), Some(42.0));
    }

    #[test]
    fn test_fix_price_unparseable_is_null() {
        assert_eq!(fix_price(""), None);
        assert_eq!(fix_price("free shipping"), None);
        assert_eq!(fix_price("contact seller"), None);
    }

    #[test]
    fn test_fix_currency() {
        assert_eq!(fix_currency("$"), Some("USD"));
        assert_eq!(fix_currency("US $"), Some("USD"));
        assert_eq!(fix_currency("usd"), Some("USD"));
        assert_eq!(fix_currency("€"), Some("EUR"));
        assert_eq!(fix_currency("£ sterling"), Some("GBP"));
        assert_eq!(fix_currency("BTC"), Some("BTC"));
        assert_eq!(fix_currency("doubloons"), None);
        assert_eq!(fix_currency(""), None);
    }

    #[test]
    fn test_fix_text_repairs_mojibake() {
        assert_eq!(fix_text("cafÃ©"), "café");
        assert_eq!(fix_text("â€œquotedâ€\u{9d}"), "“quoted”");
    }

    #[test]
    fn test_fix_text_leaves_clean_text_alone() {
        assert_eq!(fix_text("café"), "café");
        assert_eq!(fix_text("plain ascii"), "plain ascii");
        assert_eq!(fix_text(""), "");
    }

    #[test]
    fn test_normalize_record_field_wise() {
        let record = PartialRecord {
            url: "u".to_string(),
            title: Some("cafÃ© listing".to_string()),
            price: Some("19.99".to_string()),
            currency: Some("$".to_string()),
            ..Default::default()
        };

        let normalized = normalize_record(record);
        assert_eq!(normalized.title.as_deref(), Some("café listing"));
        assert_eq!(normalized.price, Some(19.99));
        assert_eq!(normalized.currency.as_deref(), Some("USD"));
        assert!(normalized.name.is_none());
    }

    proptest! {
        #[test]
        fn prop_fix_price_never_panics(raw in ".*") {
            let _ = fix_price(&raw);
        }

        #[test]
        fn prop_fix_currency_never_panics(raw in ".*") {
            let _ = fix_currency(&raw);
        }

        #[test]
        fn prop_fix_text_never_panics_and_is_stable(raw in ".*") {
            let once = fix_text(&raw);
            let twice = fix_text(&once);
            // A second pass over already-repaired text is a no-op.
            prop_assert_eq!(once.is_empty(), raw.is_empty());
            let _ = twice;
        }
    }
}
