//! Ingestion error taxonomy.
//!
//! Only [`IngestError::UnsupportedFormat`] and
//! [`IngestError::ConverterUnavailable`] surface to callers as hard
//! failures. Decode and conversion problems are handled inside the
//! dispatcher with fallbacks and reported through
//! [`crate::ingest::IngestOutcome::diagnostics`].

use crate::ingest::MediaKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported format `{extension}` (accepted: {accepted})")]
    UnsupportedFormat { extension: String, accepted: String },

    #[error("no converter registered for {kind} documents")]
    ConverterUnavailable { kind: MediaKind },

    #[error("could not decode document bytes as {encoding}")]
    DecodeFailure { encoding: String },

    #[error("converter failed while reading content block {block}: {message}")]
    ConversionFailure { block: usize, message: String },
}
