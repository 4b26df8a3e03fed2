//! Tuning knobs for the segmentation heuristics.
//!
//! The thresholds here (leading-gap size, title length cap, rejection
//! punctuation) are empirically tuned values. They are kept as configuration
//! rather than hardcoded so a host can adjust them for unusual corpora
//! without touching the scan code. The file format is a tiny TOML table; any
//! read or parse error falls back to the defaults.

use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_SEGMENTER_PATH: &str = "conf/segmenter.toml";

/// Punctuation that marks a matched line as prose rather than a heading.
/// Sentence-terminal and quotation marks, both ASCII and full-width.
const REJECTION_PUNCTUATION: &str = "\u{3002}\u{ff0e}.!\u{ff01}?\u{ff1f},\u{ff0c}\u{3001}\"'\u{201c}\u{201d}\u{2018}\u{2019}\u{300c}\u{300d}\u{300e}\u{300f}";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Prose allowed before the first heading without synthesizing a
    /// leading chapter, in characters.
    pub leading_gap_chars: usize,
    /// Maximum trimmed title length, in characters.
    pub max_title_chars: usize,
    /// Accepted candidates between invocations of the scan yield hook.
    pub yield_interval: usize,
    /// Byte cap on the prefix handed to the encoding sniffer.
    pub sniff_prefix_bytes: usize,
    /// Characters that disqualify a candidate when found in the text
    /// trailing the heading marker.
    pub rejection_punctuation: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            leading_gap_chars: 50,
            max_title_chars: 50,
            yield_interval: 100,
            sniff_prefix_bytes: 8 * 1024,
            rejection_punctuation: REJECTION_PUNCTUATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct SegmenterFile {
    segmenter: SegmenterConfig,
}

impl SegmenterConfig {
    pub fn load_default() -> Self {
        Self::load(Path::new(DEFAULT_SEGMENTER_PATH))
    }

    /// Load configuration from the given path, falling back to defaults on
    /// any error.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SegmenterFile>(&contents) {
                Ok(file) => {
                    tracing::info!(path = %path.display(), "Loaded segmenter config");
                    file.segmenter
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), "Invalid segmenter config TOML: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::debug!(path = %path.display(), "Falling back to default segmenter config: {err}");
                Self::default()
            }
        }
    }
}
