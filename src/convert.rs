//! Structured-format converter collaborators.
//!
//! Rich-text and e-book documents are not segmented heuristically; an
//! external converter walks the container and returns ordered content
//! blocks with their text already materialized. The dispatcher treats the
//! converter as opaque, so hosts can swap in their own implementation via
//! [`StructuredConverter`]. The built-in implementations open an EPUB spine
//! or a bare HTML file and strip markup with a lightweight HTML-to-text
//! pass.

use crate::config::SegmenterConfig;
use crate::encoding;
use crate::error::IngestError;
use crate::ingest::DocumentSource;
use anyhow::{Context, Result};
use epub::doc::{EpubDoc, NavPoint};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::{debug, info, warn};

/// One ordered unit of converter output.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    pub title: Option<String>,
    pub body: String,
}

/// Everything a converter learned about a document.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub title: Option<String>,
    pub blocks: Vec<ContentBlock>,
    /// One message per content block that had to be skipped.
    pub diagnostics: Vec<String>,
}

pub trait StructuredConverter {
    fn convert(&self, source: &DocumentSource, cfg: &SegmenterConfig) -> Result<Conversion>;
}

/// Reads an EPUB container by walking its spine. Chapter titles come from
/// the table of contents when a spine item has a matching entry.
#[derive(Debug, Default)]
pub struct EpubConverter;

impl StructuredConverter for EpubConverter {
    fn convert(&self, source: &DocumentSource, _cfg: &SegmenterConfig) -> Result<Conversion> {
        info!(file = %source.file_name, "Converting EPUB content");
        let cursor = Cursor::new(source.bytes.clone());
        let mut doc = EpubDoc::from_reader(cursor)
            .with_context(|| format!("Failed to open EPUB `{}`", source.file_name))?;

        let title = doc.get_title();
        let mut labels = HashMap::new();
        collect_toc_labels(&doc.toc, &mut labels);

        let mut conversion = Conversion { title, ..Default::default() };
        let mut block = 0usize;

        loop {
            block += 1;
            let label = doc
                .get_current_path()
                .and_then(|path| labels.get(&strip_fragment(&path.to_string_lossy())).cloned());

            match doc.get_current_str() {
                Some((html, _mime)) => {
                    // A very large width avoids baking in hard line breaks;
                    // paragraph segmentation happens at materialization.
                    match html2text::from_read(html.as_bytes(), 10_000) {
                        Ok(plain) => {
                            debug!(block, chars = plain.len(), "Converted content block");
                            conversion.blocks.push(ContentBlock {
                                title: label,
                                body: plain.trim_end().to_string(),
                            });
                        }
                        Err(err) => {
                            let failure = IngestError::ConversionFailure {
                                block,
                                message: err.to_string(),
                            };
                            warn!("{failure}");
                            conversion.diagnostics.push(failure.to_string());
                        }
                    }
                }
                None => {
                    let failure = IngestError::ConversionFailure {
                        block,
                        message: "spine resource is missing or unreadable".to_string(),
                    };
                    warn!("{failure}");
                    conversion.diagnostics.push(failure.to_string());
                }
            }

            if !doc.go_next() {
                break;
            }
        }

        info!(
            blocks = conversion.blocks.len(),
            skipped = conversion.diagnostics.len(),
            "Finished EPUB conversion"
        );
        Ok(conversion)
    }
}

/// Reads a standalone HTML file as a single content block.
#[derive(Debug, Default)]
pub struct HtmlConverter;

impl StructuredConverter for HtmlConverter {
    fn convert(&self, source: &DocumentSource, cfg: &SegmenterConfig) -> Result<Conversion> {
        info!(file = %source.file_name, "Converting HTML content");
        let (html, decode_diagnostic) = encoding::decode_document(&source.bytes, cfg);
        let plain = html2text::from_read(html.as_bytes(), 10_000)
            .with_context(|| format!("Failed to strip markup from `{}`", source.file_name))?;

        let mut conversion = Conversion::default();
        conversion.diagnostics.extend(decode_diagnostic);
        conversion.blocks.push(ContentBlock {
            title: None,
            body: plain.trim_end().to_string(),
        });
        Ok(conversion)
    }
}

fn collect_toc_labels(toc: &[NavPoint], labels: &mut HashMap<String, String>) {
    for nav in toc {
        labels.insert(
            strip_fragment(&nav.content.to_string_lossy()),
            nav.label.clone(),
        );
        collect_toc_labels(&nav.children, labels);
    }
}

/// Nav targets may point at an anchor inside a resource.
fn strip_fragment(path: &str) -> String {
    match path.split_once('#') {
        Some((base, _)) => base.to_string(),
        None => path.to_string(),
    }
}
