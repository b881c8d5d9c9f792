//! Inline event markers.
//!
//! A marker renders invisibly on a terminal and looks like
//! `ESC[K <b64> ESC[<n>D <b64> ESC[<n>D ... ESC[K`: each base64 run is
//! followed by a cursor-left move of its own width, and the whole block is
//! fenced by erase-line tokens.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Erase-line token that both opens and closes a marker.
pub const MARKER_TOKEN: &str = "\x1b[K";

const MARKER_PATTERN: &str = r"\x1b\[K((?:[A-Za-z0-9+/=_-]+\x1b\[[0-9]+D)+)\x1b\[K";
const CURSOR_MOVE_PATTERN: &str = r"\x1b\[[0-9]+D";

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MARKER_PATTERN).unwrap())
}

pub(crate) fn cursor_move_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CURSOR_MOVE_PATTERN).unwrap())
}

/// A complete marker located in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch<'a> {
    /// Byte range of the whole marker, fences included.
    pub span: Range<usize>,
    /// Base64 runs still interleaved with their cursor moves.
    pub payload: &'a str,
}

/// Leftmost complete marker in `buffer`, if any.
pub fn find_marker(buffer: &str) -> Option<MarkerMatch<'_>> {
    let caps = marker_regex().captures(buffer)?;
    let whole = caps.get(0)?;
    let payload = caps.get(1)?;
    Some(MarkerMatch {
        span: whole.range(),
        payload: payload.as_str(),
    })
}

/// Cheap test run before [`find_marker`]: could the bytes appended at
/// `appended_at` have completed a fence token?
///
/// Only the new bytes plus the `MARKER_TOKEN.len() - 1` bytes before them are
/// inspected, which is enough to see a token split across any number of
/// writes. A marker can only become complete when its closing token does.
pub fn may_complete_marker(buffer: &str, appended_at: usize) -> bool {
    let mut start = appended_at
        .min(buffer.len())
        .saturating_sub(MARKER_TOKEN.len() - 1);
    while !buffer.is_char_boundary(start) {
        start -= 1;
    }
    buffer[start..].contains(MARKER_TOKEN)
}
