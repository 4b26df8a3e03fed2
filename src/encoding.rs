//! Byte-to-text decoding for plain-text documents.
//!
//! Uploaded files arrive with no declared encoding, so a statistical
//! classifier (`chardetng`) inspects a bounded prefix and the whole buffer
//! is then decoded with `encoding_rs`. Sniffing never fails: an empty or
//! unclassifiable prefix simply yields UTF-8. Decoding never fails either —
//! malformed sequences are replaced rather than aborting, and the
//! replacement is reported as a diagnostic for the caller to surface.

use crate::config::SegmenterConfig;
use crate::error::IngestError;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Guess the text encoding of a document from a bounded byte prefix.
pub fn sniff(prefix: &[u8]) -> &'static Encoding {
    if prefix.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(prefix, false);
    detector.guess(None, true)
}

/// Decode a whole document with the sniffed encoding.
///
/// Returns the decoded text plus a diagnostic message when invalid byte
/// sequences had to be replaced.
pub fn decode_document(bytes: &[u8], cfg: &SegmenterConfig) -> (String, Option<String>) {
    let cap = cfg.sniff_prefix_bytes.min(bytes.len());
    let encoding = sniff(&bytes[..cap]);
    let (text, actual, malformed) = encoding.decode(bytes);
    debug!(
        encoding = actual.name(),
        bytes = bytes.len(),
        chars = text.len(),
        "Decoded document"
    );

    let diagnostic = if malformed {
        let failure = IngestError::DecodeFailure { encoding: actual.name().to_string() };
        let message = format!("{failure}; invalid sequences were replaced");
        warn!("{message}");
        Some(message)
    } else {
        None
    };

    (text.into_owned(), diagnostic)
}
