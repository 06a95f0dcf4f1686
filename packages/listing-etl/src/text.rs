//! Text extraction - page title and visible text from parsed markup.

use scraper::{Html, Selector};
use tracing::warn;

/// Pull `(text, title)` out of parsed markup.
///
/// `title` is the title element's text, or None when the page has none.
/// `text` is the full text serialization of the markup tree. Absent
/// markup yields `(None, None)`; an extraction error mid-parse degrades
/// both to empty strings rather than dropping the record, since partial
/// text is better than losing the document once parsing has begun.
pub fn text_and_title(markup: Option<&Html>) -> (Option<String>, Option<String>) {
    let Some(doc) = markup else {
        return (None, None);
    };

    let title_selector = match Selector::parse("title") {
        Ok(selector) => selector,
        Err(err) => {
            warn!("title extraction failed: {err}");
            return (Some(String::new()), Some(String::new()));
        }
    };

    let title = doc
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>());
    let text = doc.root_element().text().collect::<String>();

    (Some(text), title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_text() {
        let doc = Html::parse_document(
            "<html><head><title>Widget Shop</title></head><body><p>Buy widgets</p></body></html>",
        );
        let (text, title) = text_and_title(Some(&doc));

        assert_eq!(title.as_deref(), Some("Widget Shop"));
        assert!(text.unwrap().contains("Buy widgets"));
    }

    #[test]
    fn test_missing_title_is_absent() {
        let doc = Html::parse_document("<html><body><p>No title here</p></body></html>");
        let (text, title) = text_and_title(Some(&doc));

        assert!(title.is_none());
        assert!(text.unwrap().contains("No title here"));
    }

    #[test]
    fn test_absent_markup() {
        assert_eq!(text_and_title(None), (None, None));
    }
}
