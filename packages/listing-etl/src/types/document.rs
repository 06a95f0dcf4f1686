//! Document types - raw crawl payloads and their decoded form.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A crawled document as delivered by the upstream document source.
///
/// The content is the base64 payload exactly as crawled; it is decoded
/// once by the pipeline and the document is discarded after merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// URL of the crawled page
    pub url: String,

    /// Base64-encoded page bytes
    pub content: Vec<u8>,

    /// MIME type reported by the crawler (e.g., "text/html")
    pub content_type: String,

    /// When the page was fetched, in epoch milliseconds
    pub fetch_time: i64,
}

impl RawDocument {
    /// Create a new raw document.
    pub fn new(url: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            content_type: "text/html".to_string(),
            fetch_time: Utc::now().timestamp_millis(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the fetch time (epoch milliseconds).
    pub fn with_fetch_time(mut self, fetch_time: i64) -> Self {
        self.fetch_time = fetch_time;
        self
    }

    /// Domain of the document URL, without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        domain_of(&self.url)
    }
}

/// A document whose payload survived the decoding fallback chain.
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    /// URL of the crawled page
    pub url: String,

    /// Decoded page markup
    pub html: String,

    /// When the page was fetched, in epoch milliseconds
    pub fetch_time: i64,
}

impl DecodedDocument {
    /// Domain of the document URL, without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        domain_of(&self.url)
    }

    /// Retrieval time as an ISO-8601 string with millisecond precision.
    pub fn retrieved(&self) -> Option<String> {
        format_retrieved(self.fetch_time)
    }
}

/// Extract the host from a URL, stripping a leading `www.`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Render an epoch-millisecond timestamp as ISO-8601 with millis and offset.
pub fn format_retrieved(fetch_time: i64) -> Option<String> {
    let ts: DateTime<Utc> = Utc.timestamp_millis_opt(fetch_time).single()?;
    Some(ts.to_rfc3339_opts(SecondsFormat::Millis, false))
}
