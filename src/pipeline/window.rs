//! Word-level filtering for windowed transcripts.

use crate::pipeline::planner::TimeWindow;
use crate::provider::transcriber::WordSpan;

/// Keep the words of a timestamped transcript that fall inside a window.
///
/// A word belongs to the window when its start offset does, boundaries
/// inclusive: `start >= window.start && start <= window.end`. A word
/// straddling the window's end is kept; one that began just before the
/// window is dropped even if most of it lies inside. This mirrors the
/// provider-side filtering behavior interactive callers already rely on.
pub fn filter_words(words: &[WordSpan], window: &TimeWindow) -> String {
    words
        .iter()
        .filter(|w| w.start >= window.start && w.start <= window.end)
        .map(|w| w.word.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
