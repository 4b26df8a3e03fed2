//! Chapter construction from boundary candidates.
//!
//! Candidates carve the text into contiguous spans: each chapter runs from
//! its heading to the next heading (or the end of text). Text before the
//! first heading gets a synthetic "Beginning" chapter when the gap is large
//! enough to matter; a scan that found nothing yields a single chapter over
//! the whole text. Every build therefore covers `[0, text.len())` exactly,
//! with no gaps or overlaps.

use crate::config::SegmenterConfig;
use crate::detector::BoundaryCandidate;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Title for the single fallback chapter when no headings were found.
pub const FALLBACK_TITLE: &str = "Full Text";
/// Title for the synthetic chapter covering prose before the first heading.
pub const LEADING_TITLE: &str = "Beginning";

/// How a chapter's text is held: already materialized (structured formats)
/// or as a byte span into the retained full-text buffer (plain text). The
/// two strategies are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterBody {
    Inline(String),
    Span { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Stable identifier derived from the chapter's ordinal and title.
    pub id: String,
    /// Zero-based position in the sequence.
    pub index: usize,
    pub title: String,
    pub body: ChapterBody,
}

/// Convert boundary candidates into a contiguous chapter sequence over
/// `text`.
pub fn build(
    text: &str,
    candidates: Vec<BoundaryCandidate>,
    cfg: &SegmenterConfig,
) -> Vec<Chapter> {
    let mut chapters = Vec::with_capacity(candidates.len() + 1);

    if candidates.is_empty() {
        chapters.push(span_chapter(0, FALLBACK_TITLE.to_string(), 0, text.len()));
        debug!("No boundaries found; using single-chapter fallback");
        return chapters;
    }

    let first_start = candidates[0].start;
    if text[..first_start].chars().count() > cfg.leading_gap_chars {
        chapters.push(span_chapter(0, LEADING_TITLE.to_string(), 0, first_start));
        debug!(end = first_start, "Synthesized leading chapter");
    }

    for (i, candidate) in candidates.iter().enumerate() {
        // Without a leading chapter, the first span absorbs the small gap
        // so the sequence still covers the text from offset zero.
        let start = if i == 0 && chapters.is_empty() { 0 } else { candidate.start };
        let end = candidates
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(text.len());
        let index = chapters.len();
        chapters.push(span_chapter(index, candidate.title.clone(), start, end));
    }

    debug!(chapters = chapters.len(), "Built chapter sequence");
    chapters
}

fn span_chapter(index: usize, title: String, start: usize, end: usize) -> Chapter {
    Chapter {
        id: chapter_id(index, &title),
        index,
        title,
        body: ChapterBody::Span { start, end },
    }
}

/// Build an already-materialized chapter (structured-format path).
pub fn inline_chapter(index: usize, title: String, content: String) -> Chapter {
    Chapter {
        id: chapter_id(index, &title),
        index,
        title,
        body: ChapterBody::Inline(content),
    }
}

fn chapter_id(index: usize, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_le_bytes());
    hasher.update(title.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, start: usize) -> BoundaryCandidate {
        BoundaryCandidate { title: title.to_string(), start }
    }

    /// Spans must tile `[0, text.len())` exactly.
    fn assert_coverage(chapters: &[Chapter], text: &str) {
        assert!(!chapters.is_empty());
        let mut expected_start = 0usize;
        for (i, chapter) in chapters.iter().enumerate() {
            assert_eq!(chapter.index, i);
            match chapter.body {
                ChapterBody::Span { start, end } => {
                    assert_eq!(start, expected_start);
                    assert!(start < end);
                    expected_start = end;
                }
                ChapterBody::Inline(_) => panic!("builder never emits inline chapters"),
            }
        }
        assert_eq!(expected_start, text.len());
    }

    #[test]
    fn no_candidates_yields_single_fallback_chapter() {
        let text = "just some prose with no headings at all";
        let chapters = build(text, Vec::new(), &SegmenterConfig::default());
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, FALLBACK_TITLE);
        assert_coverage(&chapters, text);
    }

    #[test]
    fn candidate_at_offset_zero_needs_no_leading_chapter() {
        let text = "Chapter 1\nbody\nChapter 2\nmore";
        let candidates = vec![candidate("Chapter 1", 0), candidate("Chapter 2", 15)];
        let chapters = build(text, candidates, &SegmenterConfig::default());
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_coverage(&chapters, text);
    }

    #[test]
    fn gap_at_exactly_the_threshold_is_not_synthesized() {
        let text = format!("{}Chapter 1\nbody", "x".repeat(50));
        let chapters = build(&text, vec![candidate("Chapter 1", 50)], &SegmenterConfig::default());
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Chapter 1");
        // The first span absorbs the small gap.
        assert_eq!(chapters[0].body, ChapterBody::Span { start: 0, end: text.len() });
        assert_coverage(&chapters, &text);
    }

    #[test]
    fn gap_one_past_the_threshold_is_synthesized() {
        let text = format!("{}Chapter 1\nbody", "x".repeat(51));
        let chapters = build(&text, vec![candidate("Chapter 1", 51)], &SegmenterConfig::default());
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, LEADING_TITLE);
        assert_eq!(chapters[0].body, ChapterBody::Span { start: 0, end: 51 });
        assert_coverage(&chapters, &text);
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        // 30 CJK characters are 90 bytes but stay under the 50-char gap.
        let prose = "\u{5b57}".repeat(30);
        let text = format!("{prose}第一章\nbody");
        let start = prose.len();
        let chapters = build(&text, vec![candidate("第一章", start)], &SegmenterConfig::default());
        assert_eq!(chapters.len(), 1);
        assert_coverage(&chapters, &text);
    }

    #[test]
    fn last_chapter_runs_to_end_of_text() {
        let text = "第一章\n内容A\n第二章\n内容B";
        let second = text.find("第二章").unwrap();
        let chapters = build(
            text,
            vec![candidate("第一章", 0), candidate("第二章", second)],
            &SegmenterConfig::default(),
        );
        assert_eq!(
            chapters[1].body,
            ChapterBody::Span { start: second, end: text.len() }
        );
        assert_coverage(&chapters, text);
    }

    #[test]
    fn ids_are_stable_across_rebuilds() {
        let text = "Chapter 1\nbody";
        let a = build(text, vec![candidate("Chapter 1", 0)], &SegmenterConfig::default());
        let b = build(text, vec![candidate("Chapter 1", 0)], &SegmenterConfig::default());
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].id.len(), 16);
    }

    #[test]
    fn ids_differ_by_ordinal() {
        let text = "Chapter 1\nbody\nChapter 1\nagain";
        let chapters = build(
            text,
            vec![candidate("Chapter 1", 0), candidate("Chapter 1", 15)],
            &SegmenterConfig::default(),
        );
        assert_ne!(chapters[0].id, chapters[1].id);
    }
}
