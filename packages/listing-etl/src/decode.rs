//! Content decoding - turn an opaque base64 payload into page text.
//!
//! The fallback chain is ordered and all-or-nothing: strict base64,
//! then UTF-8, then US-ASCII over the same bytes, then charset
//! detection over the raw bytes. No partial or garbled text is ever
//! surfaced; a document that exhausts the chain is dropped downstream.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chardetng::EncodingDetector;
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};

/// Which stage of the fallback chain produced the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEncoding {
    /// The payload bytes were valid UTF-8
    Utf8,
    /// The payload bytes were valid US-ASCII
    Ascii,
    /// A detected legacy encoding (name per WHATWG encoding standard)
    Detected(String),
}

impl TextEncoding {
    /// Encoding label for logging.
    pub fn label(&self) -> &str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "us-ascii",
            TextEncoding::Detected(name) => name,
        }
    }
}

/// A successfully decoded payload plus the stage that decoded it.
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Decode a base64 page payload into text via the ordered fallback chain.
///
/// Malformed base64 is a hard failure for the whole chain; the later
/// stages only re-interpret the decoded bytes.
pub fn decode_payload(payload: &[u8]) -> DecodeResult<DecodedPayload> {
    let bytes = STANDARD.decode(payload)?;

    let bytes = match String::from_utf8(bytes) {
        Ok(text) => {
            return Ok(DecodedPayload {
                text,
                encoding: TextEncoding::Utf8,
            })
        }
        Err(err) => err.into_bytes(),
    };

    if bytes.is_ascii() {
        // Safe conversion: ASCII bytes are valid single-byte UTF-8.
        let text = String::from_utf8(bytes).map_err(|_| DecodeError::Undecodable)?;
        debug!("payload decoded as us-ascii");
        return Ok(DecodedPayload {
            text,
            encoding: TextEncoding::Ascii,
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes, true);
    let encoding = detector.guess(None, true);

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: used.name().to_string(),
        });
    }

    debug!(encoding = used.name(), "payload decoded via detection");
    Ok(DecodedPayload {
        text: text.into_owned(),
        encoding: TextEncoding::Detected(used.name().to_string()),
    })
}
