//! Markup escaping for serialized buffer text.
//!
//! Fast-path optimized: scans for the first escapable character,
//! then bulk-copies segments between escapes.

use memchr::{memchr2, memchr3};

/// Lookup table for bytes that need escaping in serialized text.
/// Index by byte value, true if needs escaping.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table[b'\n' as usize] = true;
    table
};

/// Replacement for an escapable byte.
#[inline]
fn replacement(b: u8) -> Option<&'static str> {
    match b {
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'&' => Some("&amp;"),
        b'"' => Some("&quot;"),
        b'\n' => Some("<br>"),
        _ => None,
    }
}

/// Escape buffer text into markup.
///
/// `<`, `>`, `&` and `"` become named entities and a newline becomes `<br>`.
///
/// # Example
/// ```
/// use imhtml::escape::escape_text_into;
///
/// let mut out = String::new();
/// escape_text_into(&mut out, "a < b\nc");
/// assert_eq!(out, "a &lt; b<br>c");
/// ```
#[inline]
pub fn escape_text_into(out: &mut String, input: &str) {
    if input.is_empty() {
        return;
    }

    let bytes = input.as_bytes();
    let mut pos = match first_text_escape(bytes) {
        Some(p) => p,
        None => {
            out.push_str(input);
            return;
        }
    };

    out.push_str(&input[..pos]);

    while pos < bytes.len() {
        let scan_start = pos;
        while pos < bytes.len() && !TEXT_ESCAPE_TABLE[bytes[pos] as usize] {
            pos += 1;
        }

        // Escapable bytes are ASCII, so both slice ends are char boundaries.
        if pos > scan_start {
            out.push_str(&input[scan_start..pos]);
        }

        if let Some(seq) = bytes.get(pos).and_then(|&b| replacement(b)) {
            out.push_str(seq);
            pos += 1;
        }
    }
}

/// Escape an attribute value for use inside double quotes.
#[inline]
pub fn escape_attr_into(out: &mut String, value: &str) {
    html_escape::encode_double_quoted_attribute_to_string(value, out);
}

#[inline]
fn first_text_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr2(b'"', b'\n', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Escape and return as a new String.
///
/// Prefer `escape_text_into` to reuse buffers.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    escape_text_into(&mut out, input);
    out
}
