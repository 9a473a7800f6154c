//! # rttp-wire
//!
//! The low-level toolkit under the rttp HTTP/1.1 server: wire-format parsers,
//! a percent codec and two primitives for coordinating shutdown.
//!
//! No socket I/O happens here. Parsers read from any [`std::io::BufRead`].
//!
//! ## Quick Start
//!
//! ```rust
//! use rttp_wire::http::{QueryString, RequestLineParser};
//!
//! let raw = b"GET /search?q=rust+lang HTTP/1.1\r\nHost: localhost\r\n\r\n";
//! let (request, body_offset) = RequestLineParser::parse_slice(raw).unwrap();
//!
//! assert_eq!(request.path(), "/search");
//! assert_eq!(request.headers().get("HOST"), Some("localhost"));
//! assert_eq!(body_offset, raw.len());
//!
//! let params = QueryString::parse(request.query_string().unwrap_or(""));
//! assert_eq!(params.get("q"), Some("rust lang"));
//! ```

pub mod http;
pub mod sync;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{
    CaseFoldedMultimap, ContentDispositionParser, HeaderBlockParser, ParseError,
    ParsedRequestLine, ParsedResponseLine, PercentCodec, QueryString, RequestLineParser,
    ResponseLineParser,
};
pub use sync::{ScopeGuardBarrier, SharedLock};
