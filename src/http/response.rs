//! Status line parsing (`HTTP/VERSION SP STATUS CRLF` + headers).

use std::io::BufRead;

use serde::Serialize;
use tracing::debug;

use super::headers::{read_line, strip_terminator, text};
use super::{CaseFoldedMultimap, HeaderBlockParser, ParseError, ParseResult};

/// Length of the `HTTP/` prefix. It is skipped, not checked.
const PROTOCOL_PREFIX_LEN: usize = 5;

/// The status line and header block of a response.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::ResponseLineParser;
///
/// let mut stream = &b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n"[..];
/// let response = ResponseLineParser::parse(&mut stream).unwrap();
///
/// assert_eq!(response.version(), "1.1");
/// assert_eq!(response.status(), "404 Not Found");
/// assert_eq!(response.status_code(), Some(404));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResponseLine {
    version: String,
    status: String,
    headers: CaseFoldedMultimap,
}

impl ParsedResponseLine {
    /// Returns the version after `HTTP/`, e.g. `1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns everything after the first space: code and reason phrase.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the leading numeric code of [`status`](Self::status), if it has one.
    pub fn status_code(&self) -> Option<u16> {
        self.status.split(' ').next()?.parse().ok()
    }

    /// Returns the header fields.
    pub fn headers(&self) -> &CaseFoldedMultimap {
        &self.headers
    }

    /// Takes ownership of the header fields.
    pub fn into_headers(self) -> CaseFoldedMultimap {
        self.headers
    }
}

/// Parser for HTTP status lines.
pub struct ResponseLineParser;

impl ResponseLineParser {
    /// Reads a status line followed by its header block from `reader`.
    ///
    /// The version starts at a fixed offset of 5, past an assumed `HTTP/`
    /// whose content is not verified. If the first space comes before that
    /// offset the version is empty.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MissingStatusSeparator`]: no space on the line.
    /// - [`ParseError::TruncatedVersion`]: the line is 5 bytes or shorter.
    /// - [`ParseError::MissingStatus`]: nothing follows the space.
    /// - [`ParseError::Io`]: reading the status line failed.
    pub fn parse<R: BufRead>(reader: &mut R) -> ParseResult<ParsedResponseLine> {
        let line = read_line(reader)?;
        match Self::parse_line(&line) {
            Ok((version, status)) => Ok(ParsedResponseLine {
                version,
                status,
                headers: HeaderBlockParser::parse(reader),
            }),
            Err(e) => {
                debug!(reason = %e, line = %String::from_utf8_lossy(&line), "rejected status line");
                Err(e)
            }
        }
    }

    fn parse_line(line: &[u8]) -> ParseResult<(String, String)> {
        let version_end = line
            .iter()
            .position(|&b| b == b' ')
            .ok_or(ParseError::MissingStatusSeparator)?;
        if line.len() <= PROTOCOL_PREFIX_LEN {
            return Err(ParseError::TruncatedVersion);
        }
        let version = text(&line[PROTOCOL_PREFIX_LEN..version_end.max(PROTOCOL_PREFIX_LEN)]);

        let status_start = version_end + 1;
        if status_start >= line.len() {
            return Err(ParseError::MissingStatus);
        }
        let status = text(strip_terminator(&line[status_start..]));

        Ok((version, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> ParseResult<ParsedResponseLine> {
        let mut stream = raw;
        ResponseLineParser::parse(&mut stream)
    }

    #[test]
    fn parse_ok() {
        let res = parse(b"HTTP/1.1 200 OK\r\n").unwrap();
        assert_eq!(res.version(), "1.1");
        assert_eq!(res.status(), "200 OK");
        assert_eq!(res.status_code(), Some(200));
        assert!(res.headers().is_empty());
    }

    #[test]
    fn parse_with_headers() {
        let res = parse(b"HTTP/1.0 301 Moved Permanently\r\nLocation: /new\r\n\r\n").unwrap();
        assert_eq!(res.version(), "1.0");
        assert_eq!(res.status(), "301 Moved Permanently");
        assert_eq!(res.headers().get("location"), Some("/new"));
    }

    #[test]
    fn prefix_is_not_verified() {
        let res = parse(b"ABCD/2 204 No Content\r\n\r\n").unwrap();
        assert_eq!(res.version(), "2");
        assert_eq!(res.status_code(), Some(204));
    }

    #[test]
    fn space_before_version_offset_gives_empty_version() {
        let res = parse(b"HTT 200 OK\r\n\r\n").unwrap();
        assert_eq!(res.version(), "");
        assert_eq!(res.status(), "200 OK");
        assert_eq!(res.status_code(), Some(200));
    }

    #[test]
    fn status_without_code() {
        let res = parse(b"HTTP/1.1 weird\r\n\r\n").unwrap();
        assert_eq!(res.status(), "weird");
        assert_eq!(res.status_code(), None);
    }

    #[test]
    fn no_space_fails() {
        assert!(matches!(
            parse(b"HTTP/1.1\r\n"),
            Err(ParseError::MissingStatusSeparator)
        ));
    }

    #[test]
    fn short_line_fails() {
        assert!(matches!(parse(b"H 1\r"), Err(ParseError::TruncatedVersion)));
    }

    #[test]
    fn nothing_after_space_fails() {
        assert!(matches!(parse(b"HTTP/1.1 "), Err(ParseError::MissingStatus)));
    }
}
