/// Width of the cursor-restore trailer the display callback leaves after the
/// text of a correlated event.
const TRAILER_CHARS: usize = 2;

pub(crate) fn count_newlines(text: &str) -> u64 {
    text.bytes().filter(|byte| *byte == b'\n').count() as u64
}

/// Byte offset where the last `TRAILER_CHARS` characters of `span` begin; 0
/// when the span is no longer than the trailer.
pub(crate) fn trailer_start(span: &str) -> usize {
    match span.char_indices().rev().nth(TRAILER_CHARS - 1) {
        Some((idx, _)) => idx,
        None => 0,
    }
}

/// `span` without its trailer, or empty when the span is no longer than it.
pub(crate) fn strip_trailer(span: &str) -> String {
    span[..trailer_start(span)].to_string()
}

/// Line boundaries recognised when splitting text into events. `\r\n` is a
/// single boundary.
fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn fragment_len(text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if ch == '\r' && text[idx + 1..].starts_with('\n') {
            return idx + 2;
        }
        if is_line_break(ch) {
            return idx + ch.len_utf8();
        }
    }
    text.len()
}

/// Splits after every line boundary, keeping terminators; an unterminated
/// tail is the last fragment.
pub(crate) fn line_fragments(text: &str) -> LineFragments<'_> {
    LineFragments { rest: text }
}

pub(crate) struct LineFragments<'a> {
    rest: &'a str,
}

impl<'a> Iterator for LineFragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (fragment, rest) = self.rest.split_at(fragment_len(self.rest));
        self.rest = rest;
        Some(fragment)
    }
}

/// Length of the prefix of `text` that can be emitted now: everything except
/// a last fragment that has no `\n` yet.
pub(crate) fn complete_lines_len(text: &str) -> usize {
    match line_fragments(text).last() {
        Some(last) if !last.contains('\n') => text.len() - last.len(),
        _ => text.len(),
    }
}

/// Turns a byte stream into text when a read may end inside a multi-byte
/// character. Invalid sequences become U+FFFD.
#[derive(Debug, Default, Clone)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Whatever is still held, decoded lossily. Call once the stream ended.
    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_is_two_chars() {
        assert_eq!(strip_trailer("ok: [host]\r\n"), "ok: [host]");
        assert_eq!(strip_trailer("abc"), "a");
        assert_eq!(strip_trailer("ab"), "");
        assert_eq!(strip_trailer("a"), "");
        assert_eq!(strip_trailer(""), "");
        assert_eq!(strip_trailer("h\u{00e9}\u{00e9}"), "h");
    }

    #[test]
    fn fragments_keep_terminators() {
        let parts: Vec<_> = line_fragments("a\nb\r\nc").collect();
        assert_eq!(parts, ["a\n", "b\r\n", "c"]);
        assert_eq!(line_fragments("").count(), 0);
        assert_eq!(complete_lines_len("a\nb\nc"), 4);
        assert_eq!(complete_lines_len("abc"), 0);
        assert_eq!(complete_lines_len("a\n"), 2);
    }

    #[test]
    fn fragments_split_on_every_line_boundary() {
        let parts: Vec<_> = line_fragments("50%\r100%\rdone\n").collect();
        assert_eq!(parts, ["50%\r", "100%\r", "done\n"]);

        let text = "a\x0bb\x0cc\x1cd\x1de\x1ef\u{85}g\u{2028}h\u{2029}i\r\n\r\n";
        let parts: Vec<_> = line_fragments(text).collect();
        assert_eq!(
            parts,
            [
                "a\x0b", "b\x0c", "c\x1c", "d\x1d", "e\x1e", "f\u{85}", "g\u{2028}",
                "h\u{2029}", "i\r\n", "\r\n",
            ]
        );
        assert_eq!(parts.concat(), text);
        assert_eq!(line_fragments("tab\there").count(), 1);
    }

    #[test]
    fn unterminated_or_carriage_return_tail_is_held_back() {
        assert_eq!(complete_lines_len("a\nb\r"), 2);
        assert_eq!(complete_lines_len("a\nb\rc"), 4);
        assert_eq!(complete_lines_len("x\r\n"), 3);
        assert_eq!(complete_lines_len(""), 0);
        assert_eq!(trailer_start("ok\r\n"), 2);
        assert_eq!(trailer_start("o"), 0);
    }

    #[test]
    fn carry_joins_split_characters() {
        let bytes = "h\u{00e9}llo".as_bytes();
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.decode(&bytes[..2]), "h");
        assert_eq!(carry.decode(&bytes[2..]), "\u{00e9}llo");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn carry_replaces_invalid_bytes() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.decode(b"a\xffb"), "a\u{fffd}b");
        assert_eq!(carry.decode(b"\xe2\x82"), "");
        assert_eq!(carry.finish(), "\u{fffd}");
    }
}
