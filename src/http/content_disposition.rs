//! Content-Disposition parameter parsing for `multipart/form-data` parts.

use super::CaseFoldedMultimap;

#[derive(Clone, Copy)]
enum State {
    SeekName,
    InName { start: usize },
    AwaitQuote { start: usize, name_end: usize },
    InValue { start: usize, name_end: usize, value_start: usize },
}

/// Parser for `token; name="value"; name2="value2"` parameter lists.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::ContentDispositionParser;
///
/// let params = ContentDispositionParser::parse(r#"form-data; name="f"; filename="a.txt""#);
/// assert_eq!(params.get("form-data"), Some(""));
/// assert_eq!(params.get("name"), Some("f"));
/// assert_eq!(params.get("filename"), Some("a.txt"));
/// ```
pub struct ContentDispositionParser;

impl ContentDispositionParser {
    /// Parses the parameters of a Content-Disposition value.
    ///
    /// A name without `=` is stored with an empty value, including a trailing
    /// one at end of input. Anything between `=` and the opening `"` is
    /// skipped. A name whose quoted value is never closed is dropped.
    pub fn parse(line: &str) -> CaseFoldedMultimap {
        let bytes = line.as_bytes();
        let mut out = CaseFoldedMultimap::new();
        let mut state = State::SeekName;

        for (c, &b) in bytes.iter().enumerate() {
            state = match state {
                State::SeekName if b == b' ' || b == b';' => State::SeekName,
                State::SeekName => State::InName { start: c },
                State::InName { start } => match b {
                    b';' => {
                        out.insert(&line[start..c], "");
                        State::SeekName
                    }
                    b'=' => State::AwaitQuote { start, name_end: c },
                    _ => state,
                },
                State::AwaitQuote { start, name_end } if b == b'"' && c + 1 < bytes.len() => {
                    State::InValue {
                        start,
                        name_end,
                        value_start: c + 1,
                    }
                }
                State::AwaitQuote { .. } => state,
                State::InValue {
                    start,
                    name_end,
                    value_start,
                } if b == b'"' => {
                    out.insert(&line[start..name_end], &line[value_start..c]);
                    State::SeekName
                }
                State::InValue { .. } => state,
            };
        }

        if let State::InName { start } = state {
            out.insert(&line[start..], "");
        }
        out
    }
}
