//! Format dispatch and batch ingestion.
//!
//! Plain text runs the heuristic pipeline (sniff, decode, boundary scan,
//! chapter build) and retains the decoded buffer for lazy materialization.
//! Rich text and EPUB delegate to a [`StructuredConverter`] and come back
//! fully materialized, with no buffer retained. Both paths normalize into
//! the same [`Chapter`] sequence.
//!
//! Batches are processed strictly sequentially — one document fully
//! completes before the next starts — so at most one decoded buffer is in
//! flight at a time. A failed document never affects its siblings.

use crate::builder::{self, Chapter, inline_chapter};
use crate::config::SegmenterConfig;
use crate::convert::{Conversion, EpubConverter, HtmlConverter, StructuredConverter};
use crate::detector;
use crate::encoding;
use crate::error::IngestError;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// File extensions the dispatcher accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["txt", "html", "htm", "xhtml", "epub"];

/// An uploaded document: raw bytes plus the declared file name. Transient;
/// it exists only for the duration of one ingestion call.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl DocumentSource {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { bytes, file_name: file_name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    PlainText,
    RichText,
    Ebook,
}

impl MediaKind {
    /// Classify a document by its file extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(Self::PlainText),
            "html" | "htm" | "xhtml" => Some(Self::RichText),
            "epub" => Some(Self::Ebook),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlainText => "plain text",
            Self::RichText => "rich text",
            Self::Ebook => "e-book",
        })
    }
}

/// The converter collaborators available to the dispatcher. A host may
/// replace either with its own implementation, or leave one out, in which
/// case documents of that kind fail with
/// [`IngestError::ConverterUnavailable`].
pub struct Converters {
    pub ebook: Option<Box<dyn StructuredConverter>>,
    pub rich_text: Option<Box<dyn StructuredConverter>>,
}

impl Default for Converters {
    fn default() -> Self {
        Self {
            ebook: Some(Box::new(EpubConverter)),
            rich_text: Some(Box::new(HtmlConverter)),
        }
    }
}

impl Converters {
    /// No converters registered; only plain text will ingest.
    pub fn none() -> Self {
        Self { ebook: None, rich_text: None }
    }
}

/// The result of one ingestion: an ordered chapter sequence, the retained
/// full-text buffer for span chapters, and the diagnostics accumulated on
/// fallback paths.
#[derive(Debug)]
pub struct IngestOutcome {
    pub title: String,
    pub chapters: Vec<Chapter>,
    pub full_text: Option<String>,
    pub diagnostics: Vec<String>,
}

/// Ingest one document.
pub fn ingest(
    source: &DocumentSource,
    converters: &Converters,
    cfg: &SegmenterConfig,
) -> Result<IngestOutcome, IngestError> {
    ingest_with_yield(source, converters, cfg, &mut || {})
}

/// Like [`ingest`], forwarding a yield hook to the boundary scan so an
/// interactive host can reschedule during long plain-text documents.
pub fn ingest_with_yield(
    source: &DocumentSource,
    converters: &Converters,
    cfg: &SegmenterConfig,
    on_batch: &mut dyn FnMut(),
) -> Result<IngestOutcome, IngestError> {
    let Some(kind) = MediaKind::from_file_name(&source.file_name) else {
        let extension = Path::new(&source.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        return Err(IngestError::UnsupportedFormat {
            extension,
            accepted: ACCEPTED_EXTENSIONS.join(", "),
        });
    };

    info!(file = %source.file_name, %kind, bytes = source.bytes.len(), "Ingesting document");
    match kind {
        MediaKind::PlainText => Ok(ingest_plain_text(source, cfg, on_batch)),
        MediaKind::RichText => {
            ingest_structured(source, converters.rich_text.as_deref(), kind, cfg)
        }
        MediaKind::Ebook => ingest_structured(source, converters.ebook.as_deref(), kind, cfg),
    }
}

/// Ingest a batch strictly sequentially. Each document fully completes
/// (success or failure) before the next starts, bounding peak memory to one
/// decoded buffer.
pub fn ingest_all(
    sources: &[DocumentSource],
    converters: &Converters,
    cfg: &SegmenterConfig,
) -> Vec<Result<IngestOutcome, IngestError>> {
    sources
        .iter()
        .map(|source| ingest(source, converters, cfg))
        .collect()
}

fn ingest_plain_text(
    source: &DocumentSource,
    cfg: &SegmenterConfig,
    on_batch: &mut dyn FnMut(),
) -> IngestOutcome {
    let (text, decode_diagnostic) = encoding::decode_document(&source.bytes, cfg);
    let candidates = detector::detect_with_yield(&text, cfg, on_batch);
    let chapters = builder::build(&text, candidates, cfg);
    info!(chapters = chapters.len(), chars = text.len(), "Ingested plain text document");
    IngestOutcome {
        title: document_title(&source.file_name),
        chapters,
        full_text: Some(text),
        diagnostics: decode_diagnostic.into_iter().collect(),
    }
}

fn ingest_structured(
    source: &DocumentSource,
    converter: Option<&dyn StructuredConverter>,
    kind: MediaKind,
    cfg: &SegmenterConfig,
) -> Result<IngestOutcome, IngestError> {
    let converter = converter.ok_or(IngestError::ConverterUnavailable { kind })?;
    let fallback_title = document_title(&source.file_name);

    match converter.convert(source, cfg) {
        Ok(conversion) => Ok(outcome_from_conversion(conversion, fallback_title)),
        Err(err) => {
            // A converter that could not read the container at all still
            // yields a document, so a batch can carry on.
            warn!(file = %source.file_name, "Structured conversion failed: {err:#}");
            let message = format!("document conversion failed: {err:#}");
            let chapter = inline_chapter(0, fallback_title.clone(), message.clone());
            Ok(IngestOutcome {
                title: fallback_title,
                chapters: vec![chapter],
                full_text: None,
                diagnostics: vec![message],
            })
        }
    }
}

fn outcome_from_conversion(conversion: Conversion, fallback_title: String) -> IngestOutcome {
    let Conversion { title, blocks, mut diagnostics } = conversion;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(fallback_title);

    let single_block = blocks.len() == 1;
    let mut raw = String::new();
    let mut chapters = Vec::new();
    for block in blocks {
        if block.body.trim().is_empty() {
            raw.push_str(&block.body);
            continue;
        }
        let index = chapters.len();
        let chapter_title = match block.title.filter(|t| !t.trim().is_empty()) {
            Some(label) => label,
            // A lone untitled block is the whole document.
            None if single_block => title.clone(),
            None => format!("Chapter {}", index + 1),
        };
        chapters.push(inline_chapter(index, chapter_title, block.body));
    }

    if chapters.is_empty() {
        let message = "converter produced no usable content; synthesized a single chapter";
        warn!("{message}");
        diagnostics.push(message.to_string());
        let body = if raw.trim().is_empty() {
            "No textual content found in this document.".to_string()
        } else {
            raw
        };
        chapters.push(inline_chapter(0, title.clone(), body));
    }

    IngestOutcome { title, chapters, full_text: None, diagnostics }
}

fn document_title(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| file_name.to_string())
}
