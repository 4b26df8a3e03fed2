//! On-demand chapter materialization.
//!
//! Span chapters hold byte offsets into the retained full-text buffer; this
//! module is the only code path that slices that buffer. Materialization is
//! pure: it never mutates the chapter or the buffer and returns a fresh
//! paragraph list each call, so concurrent reads of the same buffer need no
//! synchronization.

use crate::builder::{Chapter, ChapterBody};
use tracing::trace;

/// Shown for a span chapter whose full-text buffer is not available yet.
pub const LOADING_PLACEHOLDER: &str = "Loading\u{2026}";

/// Produce display paragraphs for a chapter.
///
/// Inline chapters are returned as-is, segmented into one paragraph per
/// line. Span chapters are sliced from `full_text`; when the slice opens
/// with a line that duplicates the chapter title it is dropped, since the
/// title is already displayed separately. Empty lines are kept as empty
/// paragraphs so spacing survives.
pub fn materialize(chapter: &Chapter, full_text: Option<&str>) -> Vec<String> {
    match &chapter.body {
        ChapterBody::Inline(content) => paragraphs(content),
        ChapterBody::Span { start, end } => {
            let Some(text) = full_text else {
                trace!(chapter = chapter.index, "Full text not loaded yet");
                return vec![LOADING_PLACEHOLDER.to_string()];
            };
            let slice = &text[*start..*end];
            let body = strip_duplicate_title(slice, &chapter.title);
            paragraphs(body)
        }
    }
}

/// Drop the first line of `slice` when it repeats the chapter title. The
/// comparison is a mutual-substring test on trimmed text, so a heading line
/// that is an abbreviation or extension of the title still counts.
fn strip_duplicate_title<'a>(slice: &'a str, title: &str) -> &'a str {
    let (first, rest) = match slice.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (slice, ""),
    };
    let first = first.trim();
    let title = title.trim();
    if first.is_empty() {
        return slice;
    }
    if first.contains(title) || title.contains(first) {
        rest
    } else {
        slice
    }
}

fn paragraphs(text: &str) -> Vec<String> {
    // A terminal newline is a span artifact, not an empty paragraph.
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::inline_chapter;

    fn span_chapter(title: &str, start: usize, end: usize) -> Chapter {
        Chapter {
            id: "test".to_string(),
            index: 0,
            title: title.to_string(),
            body: ChapterBody::Span { start, end },
        }
    }

    #[test]
    fn duplicated_title_line_is_stripped_once() {
        let text = "第一章 开端\n内容A\n内容B\n";
        let chapter = span_chapter("第一章 开端", 0, text.len());
        let shown = materialize(&chapter, Some(text));
        assert_eq!(shown, ["内容A", "内容B"]);
    }

    #[test]
    fn materialization_is_idempotent() {
        let text = "Chapter 1\nbody line\n";
        let chapter = span_chapter("Chapter 1", 0, text.len());
        let first = materialize(&chapter, Some(text));
        let second = materialize(&chapter, Some(text));
        assert_eq!(first, second);
        assert_eq!(first, ["body line"]);
    }

    #[test]
    fn partial_title_overlap_still_strips_the_heading_line() {
        // The detected title carried trailing text the heading line lacks.
        let text = "Chapter 2\nThe rest.\n";
        let chapter = span_chapter("Chapter 2: The Return", 0, text.len());
        assert_eq!(materialize(&chapter, Some(text)), ["The rest."]);
    }

    #[test]
    fn unrelated_first_line_is_kept() {
        let text = "Once upon a time\nthere was\n";
        let chapter = span_chapter("Beginning", 0, text.len());
        assert_eq!(materialize(&chapter, Some(text)), ["Once upon a time", "there was"]);
    }

    #[test]
    fn empty_lines_become_empty_paragraphs() {
        let text = "第一章\n段落一\n\n段落二\n";
        let chapter = span_chapter("第一章", 0, text.len());
        assert_eq!(materialize(&chapter, Some(text)), ["段落一", "", "段落二"]);
    }

    #[test]
    fn missing_full_text_yields_loading_placeholder() {
        let chapter = span_chapter("第一章", 0, 10);
        assert_eq!(materialize(&chapter, None), [LOADING_PLACEHOLDER]);
    }

    #[test]
    fn inline_content_is_returned_as_paragraphs() {
        let chapter = inline_chapter(0, "Intro".to_string(), "line one\nline two".to_string());
        assert_eq!(materialize(&chapter, None), ["line one", "line two"]);
    }

    #[test]
    fn crlf_line_endings_are_normalized() {
        let text = "Chapter 1\r\nbody\r\n";
        let chapter = span_chapter("Chapter 1", 0, text.len());
        assert_eq!(materialize(&chapter, Some(text)), ["body"]);
    }
}
