//! Heuristic chapter-boundary detection.
//!
//! The detector scans decoded text line by line against an ordered set of
//! heading matchers, one small regex per heading style rather than a single
//! monolithic alternation, so each style can be tested and tuned in
//! isolation. A match must span the whole line; the text trailing the
//! heading marker (up to 50 characters) is kept as part of the title.
//! Matched lines that read like prose — trailing text containing
//! sentence-terminal or quotation punctuation — are rejected, as are empty
//! or over-long titles.
//!
//! Scanning is strictly monotonic, so candidates never overlap and arrive
//! in text order. Long documents can starve an interactive host, so the
//! scan accepts a yield hook invoked every `yield_interval` accepted
//! candidates; the hook never changes scan order or results.

use crate::config::SegmenterConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static RE_CJK_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(第\s*[0-9零一二三四五六七八九十百千万亿两〇](?:\s*[0-9零一二三四五六七八九十百千万亿两〇])*\s*[章卷节篇部回集])(?P<rest>[^\r\n]{0,50})$",
    )
    .unwrap()
});
static RE_CJK_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(序章|序言|序幕|前言|引言|引子|楔子|正文|终章|終章|尾声|尾聲|后记|後記|番外|间章|插曲)(?P<rest>[^\r\n]{0,50})$",
    )
    .unwrap()
});
static RE_LATIN_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*((?:chapter|section|part)\s+(?:\d{1,6}|[ivxlcdm]{1,10}))\s*[.:：、-]?(?P<rest>[^\r\n]{0,50})$",
    )
    .unwrap()
});
static RE_LATIN_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(prologue|prolog|foreword|preface|introduction|intro|epilogue|afterword|postscript|interlude)\s*[.:：]?(?P<rest>[^\r\n]{0,50})$",
    )
    .unwrap()
});
static RE_BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{1,4}\s*[.、．](?P<rest>[^\r\n]{0,50})$").unwrap());

struct HeadingMatcher {
    name: &'static str,
    regex: &'static Lazy<Regex>,
}

/// Evaluated in order per line; the first hit wins.
static MATCHERS: [HeadingMatcher; 5] = [
    HeadingMatcher { name: "cjk-ordinal", regex: &RE_CJK_ORDINAL },
    HeadingMatcher { name: "cjk-named", regex: &RE_CJK_NAMED },
    HeadingMatcher { name: "latin-ordinal", regex: &RE_LATIN_ORDINAL },
    HeadingMatcher { name: "latin-named", regex: &RE_LATIN_NAMED },
    HeadingMatcher { name: "bare-number", regex: &RE_BARE_NUMBER },
];

/// A line that heuristically looks like a chapter heading, prior to
/// chapter building. `start` is the byte offset of the line start in the
/// scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCandidate {
    pub title: String,
    pub start: usize,
}

/// Scan the full text for chapter headings, in text order.
pub fn detect(text: &str, cfg: &SegmenterConfig) -> Vec<BoundaryCandidate> {
    detect_with_yield(text, cfg, &mut || {})
}

/// Like [`detect`], invoking `on_batch` after every `yield_interval`
/// accepted candidates so an interactive host can reschedule. The hook is
/// a scheduling courtesy only; results are identical with a no-op hook.
pub fn detect_with_yield(
    text: &str,
    cfg: &SegmenterConfig,
    on_batch: &mut dyn FnMut(),
) -> Vec<BoundaryCandidate> {
    let mut candidates = Vec::new();
    let mut pos = 0usize;

    for raw in text.split_inclusive('\n') {
        let start = pos;
        pos += raw.len();

        let line = raw.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        let Some((title, rest, matcher)) = match_heading(line) else {
            continue;
        };
        if !is_valid(&title, &rest, cfg) {
            trace!(matcher, line = %title, "Rejected boundary candidate");
            continue;
        }

        trace!(matcher, title = %title, start, "Accepted boundary candidate");
        candidates.push(BoundaryCandidate { title, start });

        if cfg.yield_interval > 0 && candidates.len() % cfg.yield_interval == 0 {
            on_batch();
        }
    }

    debug!(candidates = candidates.len(), "Boundary scan complete");
    candidates
}

/// Try each heading matcher against one line. Returns the trimmed title
/// (the whole matched line), the text trailing the marker, and the matcher
/// name.
fn match_heading(line: &str) -> Option<(String, String, &'static str)> {
    for matcher in &MATCHERS {
        if let Some(caps) = matcher.regex.captures(line) {
            let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
            return Some((line.trim().to_string(), rest.to_string(), matcher.name));
        }
    }
    None
}

fn is_valid(title: &str, rest: &str, cfg: &SegmenterConfig) -> bool {
    let title_len = title.chars().count();
    if title_len == 0 || title_len > cfg.max_title_chars {
        return false;
    }
    // Punctuation in the trailing text marks the line as prose. The marker
    // itself is exempt so `N.`-style headings stay eligible.
    !rest
        .trim()
        .chars()
        .any(|ch| cfg.rejection_punctuation.contains(ch))
}
