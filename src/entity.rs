//! Entity and numeric character reference resolution.
//!
//! Only the eight named entities the markup dialect has always accepted
//! are recognized, plus decimal `&#NNN;` references. Anything else is not
//! an escape and the caller keeps the `&` as a literal character.

use std::borrow::Cow;

use crate::cursor::Cursor;

/// Named entities, matched case-insensitively including the trailing `;`.
const NAMED: &[(&[u8], char)] = &[
    (b"&amp;", '&'),
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&nbsp;", ' '),
    (b"&copy;", '\u{a9}'),
    (b"&quot;", '"'),
    (b"&reg;", '\u{ae}'),
    (b"&apos;", '\''),
];

/// Longest digit run accepted in a numeric reference (`u32::MAX` has 10).
const MAX_REFERENCE_DIGITS: usize = 10;

/// Resolve the escape at the start of `text`.
///
/// Returns the replacement character and the number of bytes consumed, or
/// `None` when `text` does not start with a recognized escape.
///
/// # Example
/// ```
/// use imhtml::entity::resolve;
///
/// assert_eq!(resolve(b"&amp;foo"), Some(('&', 5)));
/// assert_eq!(resolve(b"&#65;"), Some(('A', 5)));
/// assert_eq!(resolve(b"&bogus;"), None);
/// ```
pub fn resolve(text: &[u8]) -> Option<(char, usize)> {
    if text.first() != Some(&b'&') {
        return None;
    }

    for &(spelling, ch) in NAMED {
        if text.len() >= spelling.len() && text[..spelling.len()].eq_ignore_ascii_case(spelling) {
            return Some((ch, spelling.len()));
        }
    }

    if text.get(1) == Some(&b'#') {
        return resolve_numeric(text);
    }

    None
}

/// `&#` + decimal digits + `;`.
fn resolve_numeric(text: &[u8]) -> Option<(char, usize)> {
    let mut cursor = Cursor::new_at(text, 2);
    let digits_start = cursor.offset();
    let digits = cursor.skip_while(|b| b.is_ascii_digit());
    if digits == 0 || digits > MAX_REFERENCE_DIGITS {
        return None;
    }
    let digit_bytes = cursor.slice_from(digits_start);
    if !cursor.eat(b';') {
        return None;
    }

    let value = digit_bytes
        .iter()
        .try_fold(0u32, |acc, &d| acc.checked_mul(10)?.checked_add(u32::from(d - b'0')))?;
    if value == 0 {
        return None;
    }
    let ch = char::from_u32(value)?;
    Some((ch, cursor.offset()))
}

/// Resolve every escape in `text`, leaving unrecognized `&` sequences as-is.
///
/// Borrows when `text` has no `&`.
pub fn unescape(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr::memchr(b'&', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut pos = first;
    while pos < bytes.len() {
        if bytes[pos] == b'&' {
            if let Some((ch, len)) = resolve(&bytes[pos..]) {
                out.push(ch);
                pos += len;
                continue;
            }
            out.push('&');
            pos += 1;
            continue;
        }
        let next = memchr::memchr(b'&', &bytes[pos..]).map_or(bytes.len(), |n| pos + n);
        out.push_str(&text[pos..next]);
        pos = next;
    }
    Cow::Owned(out)
}
