//! chapterleaf — document ingestion and chapter segmentation.
//!
//! Given an uploaded document of unknown encoding and unknown structural
//! markup, this crate decides how to decode the bytes, splits the text into
//! an ordered chapter sequence using heuristic heading detection, and
//! exposes chapters either fully materialized (structured formats) or as
//! lazy spans into a retained full-text buffer (plain text), so large
//! documents are never duplicated in memory.
//!
//! The pipeline for plain text is sniff → decode → boundary scan → chapter
//! build; rich text and EPUB bypass the heuristics entirely and go through
//! a [`StructuredConverter`]. Chapter text is produced on demand by
//! [`materialize`].
//!
//! ```no_run
//! use chapterleaf::{Converters, DocumentSource, SegmenterConfig, ingest, materialize};
//!
//! let source = DocumentSource::new("novel.txt", std::fs::read("novel.txt")?);
//! let outcome = ingest(&source, &Converters::default(), &SegmenterConfig::default())?;
//! for chapter in &outcome.chapters {
//!     let paragraphs = materialize(chapter, outcome.full_text.as_deref());
//!     println!("{}: {} paragraphs", chapter.title, paragraphs.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod config;
pub mod convert;
pub mod detector;
pub mod encoding;
pub mod error;
pub mod ingest;
pub mod materializer;

pub use builder::{Chapter, ChapterBody};
pub use config::SegmenterConfig;
pub use convert::{ContentBlock, Conversion, EpubConverter, HtmlConverter, StructuredConverter};
pub use detector::BoundaryCandidate;
pub use error::IngestError;
pub use ingest::{
    Converters, DocumentSource, IngestOutcome, MediaKind, ingest, ingest_all, ingest_with_yield,
};
pub use materializer::materialize;
