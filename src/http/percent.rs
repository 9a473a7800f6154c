//! Percent-encoding and decoding for query strings and form values.

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent codec using `+` for space.
///
/// The wire alphabet escapes `! # $ & ' ( ) * + , / 0-9 : ; = ? @ [ ]`.
/// Digits are part of it, so `encode("a1")` yields `a%31`. This codec also
/// escapes `%` on top of that alphabet (as `%25`); together with `+` being
/// escaped, that keeps `decode(encode(x)) == x` for every input.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::PercentCodec;
///
/// assert_eq!(PercentCodec::encode("a b&c"), "a+b%26c");
/// assert_eq!(PercentCodec::decode("a+b%26c"), "a b&c");
/// ```
pub struct PercentCodec;

impl PercentCodec {
    /// Returns `value` with reserved characters escaped as `%XX` and spaces as `+`.
    pub fn encode(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                ' ' => out.push('+'),
                c if c.is_ascii() && is_reserved(c as u8) => {
                    let b = c as u8;
                    out.push('%');
                    out.push(HEX_UPPER[(b >> 4) as usize] as char);
                    out.push(HEX_UPPER[(b & 0x0F) as usize] as char);
                }
                c => out.push(c),
            }
        }
        out
    }

    /// Decodes `value`, replacing byte sequences that are not valid UTF-8.
    ///
    /// Never fails: see [`decode_bytes`](Self::decode_bytes) for the rules.
    pub fn decode(value: &str) -> String {
        String::from_utf8_lossy(&Self::decode_bytes(value.as_bytes())).into_owned()
    }

    /// Decodes `value` to raw bytes.
    ///
    /// - `%` followed by at least two more bytes consumes all three; the two
    ///   bytes are read as hex, using only the valid leading hex digits
    ///   (`%4G` is `0x04`, `%ZZ` is `0x00`).
    /// - `%` with fewer than two bytes after it is kept literally.
    /// - `+` always becomes a space.
    pub fn decode_bytes(value: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(value.len());
        let mut i = 0;
        while i < value.len() {
            match value[i] {
                b'%' if i + 2 < value.len() => {
                    out.push(hex_prefix(value[i + 1], value[i + 2]));
                    i += 3;
                }
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                other => {
                    out.push(other);
                    i += 1;
                }
            }
        }
        out
    }
}

fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$'..=b',' | b'/'..=b';' | b'=' | b'?' | b'@' | b'[' | b']'
    )
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn hex_prefix(hi: u8, lo: u8) -> u8 {
    match (hex_digit(hi), hex_digit(lo)) {
        (Some(h), Some(l)) => h << 4 | l,
        (Some(h), None) => h,
        _ => 0,
    }
}
