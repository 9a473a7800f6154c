//! HTTP/1.x wire-format parsing and text codecs.
//!
//! This module provides:
//! [`CaseFoldedMultimap`], [`PercentCodec`], [`QueryString`],
//! [`HeaderBlockParser`], [`RequestLineParser`], [`ResponseLineParser`] and
//! [`ContentDispositionParser`].
//!
//! All parsers are synchronous, hold no shared state and can be used from any
//! number of threads at once. They read from any [`std::io::BufRead`], so a
//! byte slice, a `BufReader` over a socket or a cursor all work.

use thiserror::Error;

pub mod content_disposition;
pub mod headers;
pub mod multimap;
pub mod percent;
pub mod query;
pub mod request;
pub mod response;

pub use content_disposition::ContentDispositionParser;
pub use headers::HeaderBlockParser;
pub use multimap::CaseFoldedMultimap;
pub use percent::PercentCodec;
pub use query::QueryString;
pub use request::{ParsedRequestLine, RequestLineParser};
pub use response::{ParsedResponseLine, ResponseLineParser};

/// Structural failure of a request line or status line.
///
/// Deliberately coarse: the hot path only needs to know that the line is
/// unusable and the whole message should be rejected.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request line has no space after the method")]
    MissingMethod,

    #[error("request target is not followed by a space")]
    UnterminatedTarget,

    #[error("no `/` after the request target")]
    MissingProtocol,

    #[error("protocol is not HTTP")]
    UnsupportedProtocol,

    #[error("status line has no space")]
    MissingStatusSeparator,

    #[error("status line is too short to hold a version")]
    TruncatedVersion,

    #[error("nothing follows the version on the status line")]
    MissingStatus,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ParseResult<T> = Result<T, ParseError>;
