//! Long-text chunking
//!
//! Splits text into pieces no longer than a provider's request limit,
//! preferring to cut at paragraph breaks, then at sentence ends, and only
//! hard-cutting inside unpunctuated runs.
//!
//! All lengths and positions are in characters (Unicode scalar values), not
//! bytes. The output depends only on the input and `max_len`.

use regex::Regex;
use std::sync::OnceLock;

/// Chunk length used when the configuration does not override it
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

/// Breaks are only accepted in the last 20% of a window, so chunks are
/// never needlessly short.
const WINDOW_START_RATIO: f64 = 0.8;

/// Two or more newlines in any of the common newline forms
fn paragraph_break() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\n{2,}|\r\n\r\n|\r{2,}").expect("paragraph pattern is valid")
    })
}

/// Terminal punctuation, optional closing quotes/parens, then whitespace or end of window
fn sentence_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[.?!]["')]*(?:\s+|$)"#).expect("sentence pattern is valid")
    })
}

/// Split `text` into ordered, trimmed, non-empty chunks of at most `max_len` characters.
///
/// While the remaining text is longer than `max_len`, the first `max_len`
/// characters form a window and the cut is placed at:
/// 1. the end of the last paragraph break starting in the window's last 20%
/// 2. otherwise, the end of the last sentence terminator (with its trailing
///    whitespace) starting in the window's last 20%
/// 3. otherwise, exactly `max_len` characters
///
/// A `max_len` of 0 is treated as 1.
///
/// # Examples
///
/// ```
/// use speakq_ap::playback::chunker::split_text;
///
/// assert!(split_text("", 100).is_empty());
/// assert_eq!(split_text("  short text  ", 100), vec!["short text"]);
/// ```
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let window_start = (max_len as f64 * WINDOW_START_RATIO) as usize;

    let mut chunks = Vec::new();
    let mut remaining = text;

    // `nth(max_len)` exists only while more than max_len characters remain;
    // its byte offset is the end of the window.
    while let Some((window_end, _)) = remaining.char_indices().nth(max_len) {
        let window = &remaining[..window_end];

        let cut = last_break_in_window(paragraph_break(), window, window_start)
            .or_else(|| last_break_in_window(sentence_end(), window, window_start))
            .unwrap_or(window_end);

        push_trimmed(&mut chunks, &remaining[..cut]);
        remaining = remaining[cut..].trim_start();
    }

    push_trimmed(&mut chunks, remaining);
    chunks
}

/// Byte offset just past the last match of `pattern`, if that match starts
/// at or after character `window_start`.
///
/// Matches are ordered by start, so only the final one can be the latest
/// qualifying break.
fn last_break_in_window(pattern: &Regex, window: &str, window_start: usize) -> Option<usize> {
    let found = pattern.find_iter(window).last()?;
    let start_chars = window[..found.start()].chars().count();
    (start_chars >= window_start).then_some(found.end())
}

fn push_trimmed(chunks: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        chunks.push(piece.to_string());
    }
}
