//! Header block parsing.
//!
//! A header block is a run of `Name: value\r\n` lines ended by the first line
//! that contains no `:` (normally the empty line before the body).

use std::io::{self, BufRead};

use tracing::trace;

use super::CaseFoldedMultimap;

/// Parser for a block of header lines.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::HeaderBlockParser;
///
/// let mut stream = &b"Host: localhost\r\nAccept: */*\r\n\r\nbody"[..];
/// let headers = HeaderBlockParser::parse(&mut stream);
///
/// assert_eq!(headers.get("host"), Some("localhost"));
/// assert_eq!(headers.len(), 2);
/// assert_eq!(stream, b"body");
/// ```
pub struct HeaderBlockParser;

impl HeaderBlockParser {
    /// Reads header lines from `reader` until a line without `:` is consumed.
    ///
    /// The name is everything before the first `:`. One leading space of the
    /// value is skipped and the last byte of the value is always dropped, as
    /// it is expected to be the `\r` of a CRLF terminator. With LF-only input
    /// that drop eats the final character of every value.
    ///
    /// Never fails. A read error ends the block like a terminator line would.
    pub fn parse<R: BufRead>(reader: &mut R) -> CaseFoldedMultimap {
        let mut headers = CaseFoldedMultimap::new();
        loop {
            let line = match read_line(reader) {
                Ok(line) => line,
                Err(e) => {
                    trace!(error = %e, "read error inside header block");
                    break;
                }
            };
            let Some(colon) = line.iter().position(|&b| b == b':') else {
                break;
            };

            let mut value_start = colon + 1;
            if value_start < line.len() {
                if line[value_start] == b' ' {
                    value_start += 1;
                }
                if value_start < line.len() {
                    headers.insert(
                        text(&line[..colon]),
                        text(&line[value_start..line.len() - 1]),
                    );
                }
            }
        }
        trace!(fields = headers.len(), "header block parsed");
        headers
    }
}

/// Reads one line, without its `\n`. Returns an empty line at end of input.
pub(crate) fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    Ok(line)
}

/// Drops the final byte of `line`, the `\r` of a CRLF terminator.
pub(crate) fn strip_terminator(line: &[u8]) -> &[u8] {
    &line[..line.len().saturating_sub(1)]
}

pub(crate) fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> (CaseFoldedMultimap, Vec<u8>) {
        let mut stream = raw;
        let headers = HeaderBlockParser::parse(&mut stream);
        (headers, stream.to_vec())
    }

    #[test]
    fn single_field_consumes_terminator() {
        let (h, rest) = parse(b"Name: value\r\n\r\n");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("name"), Some("value"));
        assert!(rest.is_empty());
    }

    #[test]
    fn stops_at_first_colonless_line() {
        let (h, rest) = parse(b"A: 1\r\nnot a header\r\nB: 2\r\n\r\n");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("a"), Some("1"));
        assert_eq!(rest, b"B: 2\r\n\r\n");
    }

    #[test]
    fn value_without_space_and_with_colons() {
        let (h, _) = parse(b"Host:example.com:8080\r\n\r\n");
        assert_eq!(h.get("HOST"), Some("example.com:8080"));
    }

    #[test]
    fn only_one_leading_space_is_skipped() {
        let (h, _) = parse(b"X:  padded\r\n\r\n");
        assert_eq!(h.get("x"), Some(" padded"));
    }

    #[test]
    fn empty_value_is_kept() {
        let (h, _) = parse(b"X-Empty:\r\nX-Space: \r\n\r\n");
        assert_eq!(h.get("x-empty"), Some(""));
        assert_eq!(h.get("x-space"), Some(""));
    }

    #[test]
    fn lf_only_lines_lose_last_character() {
        let (h, _) = parse(b"Name: value\n\n");
        assert_eq!(h.get("name"), Some("valu"));
    }

    #[test]
    fn colon_at_end_of_line_yields_no_entry() {
        let (h, _) = parse(b"Bare:\nNext: ok\r\n\r\n");
        assert!(!h.contains("bare"));
        assert_eq!(h.get("next"), Some("ok"));
    }

    #[test]
    fn repeated_fields_are_kept() {
        let (h, _) = parse(b"Set-Cookie: a=1\r\nset-cookie: b=2\r\n\r\n");
        let all: Vec<_> = h.get_all("Set-Cookie").collect();
        assert_eq!(all, vec!["a=1", "b=2"]);
    }

    #[test]
    fn end_of_input_ends_block() {
        let (h, _) = parse(b"A: 1\r\n");
        assert_eq!(h.get("a"), Some("1"));
        let (h, _) = parse(b"");
        assert!(h.is_empty());
    }
}
