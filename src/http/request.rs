//! Request line parsing (`METHOD SP target SP HTTP/VERSION CRLF` + headers).

use std::io::BufRead;

use serde::Serialize;
use tracing::debug;

use super::headers::{read_line, strip_terminator, text};
use super::{CaseFoldedMultimap, HeaderBlockParser, ParseError, ParseResult, QueryString};

/// Protocol name required before the `/` of the version.
const PROTOCOL: &[u8] = b"HTTP";

/// The request line and header block of an incoming request.
///
/// The path and query string are kept exactly as received; use
/// [`query_params`](Self::query_params) for decoded parameters.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::RequestLineParser;
///
/// let raw = b"GET /hello?name=world HTTP/1.1\r\nHost: localhost\r\n\r\n";
/// let (request, _offset) = RequestLineParser::parse_slice(raw).unwrap();
///
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.path(), "/hello");
/// assert_eq!(request.query_string(), Some("name=world"));
/// assert_eq!(request.version(), "1.1");
/// assert_eq!(request.headers().get("host"), Some("localhost"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ParsedRequestLine {
    method: String,
    path: String,
    query: Option<String>,
    version: String,
    headers: CaseFoldedMultimap,
}

impl ParsedRequestLine {
    /// Returns the method token, e.g. `GET`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the path, without the query string and not percent-decoded.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`), if any.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the version after `HTTP/`, e.g. `1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the header fields.
    pub fn headers(&self) -> &CaseFoldedMultimap {
        &self.headers
    }

    /// Takes ownership of the header fields.
    pub fn into_headers(self) -> CaseFoldedMultimap {
        self.headers
    }

    /// Returns the query parameters with percent-decoded values.
    pub fn query_params(&self) -> CaseFoldedMultimap {
        self.query
            .as_deref()
            .map(QueryString::parse)
            .unwrap_or_default()
    }
}

/// Parser for HTTP request lines.
pub struct RequestLineParser;

impl RequestLineParser {
    /// Reads a request line followed by its header block from `reader`.
    ///
    /// Only the first `?` in the target separates path from query. The byte
    /// before `\n` (normally `\r`) is dropped from the version.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MissingMethod`]: no space on the line.
    /// - [`ParseError::UnterminatedTarget`]: no space after the target.
    /// - [`ParseError::MissingProtocol`]: no `/` after the target.
    /// - [`ParseError::UnsupportedProtocol`]: the text before `/` is not `HTTP`.
    /// - [`ParseError::Io`]: reading the request line failed.
    ///
    /// Headers are only read once the request line is valid.
    pub fn parse<R: BufRead>(reader: &mut R) -> ParseResult<ParsedRequestLine> {
        let line = read_line(reader)?;
        match Self::parse_line(&line) {
            Ok((method, path, query, version)) => Ok(ParsedRequestLine {
                method,
                path,
                query,
                version,
                headers: HeaderBlockParser::parse(reader),
            }),
            Err(e) => {
                debug!(reason = %e, line = %String::from_utf8_lossy(&line), "rejected request line");
                Err(e)
            }
        }
    }

    /// Parses from an in-memory buffer, returning the request and the offset
    /// at which the body begins in `buf`.
    pub fn parse_slice(buf: &[u8]) -> ParseResult<(ParsedRequestLine, usize)> {
        let mut rest = buf;
        let request = Self::parse(&mut rest)?;
        Ok((request, buf.len() - rest.len()))
    }

    fn parse_line(line: &[u8]) -> ParseResult<(String, String, Option<String>, String)> {
        let method_end = line
            .iter()
            .position(|&b| b == b' ')
            .ok_or(ParseError::MissingMethod)?;

        let mut query_start = None;
        let mut target_end = None;
        for (i, &b) in line.iter().enumerate().skip(method_end + 1) {
            match b {
                b'?' if query_start.is_none() => query_start = Some(i + 1),
                b' ' => {
                    target_end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let target_end = target_end.ok_or(ParseError::UnterminatedTarget)?;

        let (path, query) = match query_start {
            Some(q) => (
                text(&line[method_end + 1..q - 1]),
                Some(text(&line[q..target_end])),
            ),
            None => (text(&line[method_end + 1..target_end]), None),
        };

        let protocol_start = target_end + 1;
        let protocol_end = line[protocol_start..]
            .iter()
            .position(|&b| b == b'/')
            .map(|p| protocol_start + p)
            .ok_or(ParseError::MissingProtocol)?;
        if &line[protocol_start..protocol_end] != PROTOCOL {
            return Err(ParseError::UnsupportedProtocol);
        }
        let version = text(strip_terminator(&line[protocol_end + 1..]));

        Ok((text(&line[..method_end]), path, query, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (req, offset) = RequestLineParser::parse_slice(raw).unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/");
        assert_eq!(req.query_string(), None);
        assert_eq!(req.version(), "1.1");
        assert_eq!(req.headers().get("host"), Some("localhost"));
        assert_eq!(offset, raw.len());
    }

    #[test]
    fn parse_query_string() {
        let raw = b"GET /a/b?x=1&y=2 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let (req, _) = RequestLineParser::parse_slice(raw).unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query_string(), Some("x=1&y=2"));
        assert_eq!(req.version(), "1.1");
        let params = req.query_params();
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.get("y"), Some("2"));
    }

    #[test]
    fn only_first_question_mark_splits() {
        let raw = b"GET /p?a=1?b=2 HTTP/1.0\r\n\r\n";
        let (req, _) = RequestLineParser::parse_slice(raw).unwrap();
        assert_eq!(req.path(), "/p");
        assert_eq!(req.query_string(), Some("a=1?b=2"));
        assert_eq!(req.version(), "1.0");
    }

    #[test]
    fn path_stays_encoded() {
        let raw = b"GET /a%20b?q=c%20d HTTP/1.1\r\n\r\n";
        let (req, _) = RequestLineParser::parse_slice(raw).unwrap();
        assert_eq!(req.path(), "/a%20b");
        assert_eq!(req.query_string(), Some("q=c%20d"));
        assert_eq!(req.query_params().get("q"), Some("c d"));
    }

    #[test]
    fn body_offset_points_past_headers() {
        let raw = b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let (req, offset) = RequestLineParser::parse_slice(raw).unwrap();
        assert_eq!(req.headers().get("content-length"), Some("5"));
        assert_eq!(&raw[offset..], b"hello");
    }

    #[test]
    fn no_space_fails() {
        let err = RequestLineParser::parse_slice(b"BADLINE\r\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingMethod));
    }

    #[test]
    fn unterminated_target_fails() {
        let err = RequestLineParser::parse_slice(b"GET /index.html\r\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedTarget));
    }

    #[test]
    fn missing_slash_fails() {
        let err = RequestLineParser::parse_slice(b"GET / HTTP\r\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingProtocol));
    }

    #[test]
    fn wrong_protocol_fails() {
        let err = RequestLineParser::parse_slice(b"GET / FTP/1.1\r\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedProtocol));
    }

    #[test]
    fn headers_not_read_on_failure() {
        let mut stream = &b"GET / FTP/1.1\r\nHost: x\r\n\r\n"[..];
        assert!(RequestLineParser::parse(&mut stream).is_err());
        assert_eq!(stream, b"Host: x\r\n\r\n");
    }

    #[test]
    fn serializes_to_json() {
        let (req, _) = RequestLineParser::parse_slice(b"GET /x?y HTTP/1.1\r\n\r\n").unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["path"], "/x");
        assert_eq!(json["query"], "y");
        assert_eq!(json["version"], "1.1");
    }
}
