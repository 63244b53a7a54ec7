//! Tag tokenizer for the markup dialect.
//!
//! The dialect is defined entirely by a fixed, ordered table of tag
//! spellings. A "simple" spelling matches only when followed immediately
//! by `>`; an "optioned" spelling matches when followed by a space and an
//! attribute list that ends at the first unquoted `>`. Comments get their
//! own kind, and any other `<...>` becomes an [`TagKind::Unknown`] token
//! that the formatter renders as literal text.

use crate::cursor::Cursor;
use crate::entity;

/// Classification of a recognized tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `<B>`, `<BOLD>`, `<STRONG>`
    Bold,
    BoldEnd,
    /// `<I>`, `<ITALIC>`, `<EM>`
    Italic,
    ItalicEnd,
    /// `<U>`, `<UNDERLINE>`
    Underline,
    UnderlineEnd,
    /// `<S>`, `<STRIKE>`
    Strike,
    StrikeEnd,
    Sub,
    SubEnd,
    Sup,
    SupEnd,
    Pre,
    PreEnd,
    Title,
    TitleEnd,
    /// `<BR>`, `<BR/>`, `<BR ...>`
    Br,
    /// `<HR>`, `<HR ...>`
    Hr,
    /// `<FONT ...>` with attributes.
    Font,
    FontEnd,
    /// `<A ...>`
    Anchor,
    AnchorEnd,
    /// `<BODY ...>`
    Body,
    BodyEnd,
    /// `<IMG>`, `<IMG ...>`
    Img,
    /// `<SPAN ...>`, `<P ...>`, `<H3 ...>`, `<HTML ...>`: carry a `style` attribute.
    Styled,
    SpanEnd,
    /// Structural tags without visible effect (`P`, `H3`, `HTML`, `HEAD`,
    /// `BINARY`, `CITE`, bare `FONT`/`SPAN`/`BODY` and their closers).
    Inert,
    /// `<!-- ... -->`
    Comment,
    /// Anything else between `<` and `>`.
    Unknown,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Form {
    Simple,
    Optioned,
}

/// Recognized spellings, in match order.
const TABLE: &[(&[u8], Form, TagKind)] = {
    use Form::{Optioned as O, Simple as S};
    use TagKind::*;
    &[
        (b"B", S, Bold),
        (b"BOLD", S, Bold),
        (b"/B", S, BoldEnd),
        (b"/BOLD", S, BoldEnd),
        (b"I", S, Italic),
        (b"ITALIC", S, Italic),
        (b"/I", S, ItalicEnd),
        (b"/ITALIC", S, ItalicEnd),
        (b"U", S, Underline),
        (b"UNDERLINE", S, Underline),
        (b"/U", S, UnderlineEnd),
        (b"/UNDERLINE", S, UnderlineEnd),
        (b"S", S, Strike),
        (b"STRIKE", S, Strike),
        (b"/S", S, StrikeEnd),
        (b"/STRIKE", S, StrikeEnd),
        (b"SUB", S, Sub),
        (b"/SUB", S, SubEnd),
        (b"SUP", S, Sup),
        (b"/SUP", S, SupEnd),
        (b"PRE", S, Pre),
        (b"/PRE", S, PreEnd),
        (b"TITLE", S, Title),
        (b"/TITLE", S, TitleEnd),
        (b"BR", S, Br),
        (b"HR", S, Hr),
        (b"/FONT", S, FontEnd),
        (b"/A", S, AnchorEnd),
        (b"P", S, Inert),
        (b"/P", S, Inert),
        (b"H3", S, Inert),
        (b"/H3", S, Inert),
        (b"HTML", S, Inert),
        (b"/HTML", S, Inert),
        (b"BODY", S, Inert),
        (b"/BODY", S, BodyEnd),
        (b"FONT", S, Inert),
        (b"HEAD", S, Inert),
        (b"/HEAD", S, Inert),
        (b"BINARY", S, Inert),
        (b"/BINARY", S, Inert),
        (b"HR", O, Hr),
        (b"FONT", O, Font),
        (b"BODY", O, Body),
        (b"A", O, Anchor),
        (b"IMG", O, Img),
        (b"P", O, Styled),
        (b"H3", O, Styled),
        (b"HTML", O, Styled),
        (b"CITE", S, Inert),
        (b"/CITE", S, Inert),
        (b"EM", S, Italic),
        (b"/EM", S, ItalicEnd),
        (b"STRONG", S, Bold),
        (b"/STRONG", S, BoldEnd),
        (b"SPAN", O, Styled),
        (b"/SPAN", S, SpanEnd),
        (b"BR/", S, Br),
        (b"IMG", S, Img),
        (b"SPAN", S, Inert),
        (b"BR", O, Br),
    ]
};

/// A tag recognized at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagToken<'a> {
    pub kind: TagKind,
    /// Text between `<` and `>` for tags; the inner text for comments.
    pub text: &'a str,
    /// Bytes consumed after the `<`, including the closing `>` (or `-->`).
    pub len: usize,
}

impl<'a> TagToken<'a> {
    /// Attribute value from this tag, see [`get_opt`].
    pub fn opt(&self, name: &str) -> Option<String> {
        get_opt(self.text, name)
    }
}

/// Recognize a tag in `input`, which starts just after a `<`.
///
/// Returns `None` only when no `>` follows at all; every other sequence
/// produces a token, falling back to [`TagKind::Unknown`].
///
/// # Example
/// ```
/// use imhtml::tag::{next_tag, TagKind};
///
/// let tok = next_tag("FONT COLOR=\"red\">hi").unwrap();
/// assert_eq!(tok.kind, TagKind::Font);
/// assert_eq!(tok.text, "FONT COLOR=\"red\"");
/// assert_eq!(tok.len, 17);
/// ```
pub fn next_tag(input: &str) -> Option<TagToken<'_>> {
    let bytes = input.as_bytes();
    let close = memchr::memchr(b'>', bytes)?;

    for &(spelling, form, kind) in TABLE {
        let cursor = Cursor::new(bytes);
        let matched = match form {
            Form::Simple => match_simple(cursor, spelling),
            Form::Optioned => match_optioned(cursor, spelling),
        };
        if let Some(end) = matched {
            return Some(TagToken {
                kind,
                text: &input[..end],
                len: end + 1,
            });
        }
    }

    if let Some(token) = match_comment(input) {
        return Some(token);
    }

    Some(TagToken {
        kind: TagKind::Unknown,
        text: &input[..close],
        len: close + 1,
    })
}

/// Offset of the `>` when `spelling>` starts the input.
fn match_simple(mut cursor: Cursor<'_>, spelling: &[u8]) -> Option<usize> {
    if cursor.eat_ignore_case(spelling) && cursor.at(b'>') {
        Some(cursor.offset())
    } else {
        None
    }
}

/// Offset of the first unquoted `>` after `spelling `.
fn match_optioned(mut cursor: Cursor<'_>, spelling: &[u8]) -> Option<usize> {
    if !cursor.eat_ignore_case(spelling) || !cursor.eat(b' ') {
        return None;
    }

    let mut quote: Option<u8> = None;
    while let Some(b) = cursor.peek() {
        match (b, quote) {
            (b'"' | b'\'', None) => quote = Some(b),
            (q, Some(open)) if q == open => quote = None,
            (b'>', None) => return Some(cursor.offset()),
            _ => {}
        }
        cursor.bump();
    }
    None
}

fn match_comment(input: &str) -> Option<TagToken<'_>> {
    let mut cursor = Cursor::new(input.as_bytes());
    if !cursor.eat_bytes(b"!--") {
        return None;
    }
    let inner = cursor.find_bytes(b"-->")?;
    let start = cursor.offset();
    Some(TagToken {
        kind: TagKind::Comment,
        text: &input[start..start + inner],
        len: start + inner + 3,
    })
}

/// Extract the value of attribute `name` from raw tag text.
///
/// Scans token by token (respecting double quotes), so `COLOR` never
/// matches inside `BACKCOLOR`. Values may be double-quoted, single-quoted
/// or bare; an unterminated quote yields `None`. Entities in the value are
/// resolved.
///
/// # Example
/// ```
/// use imhtml::tag::get_opt;
///
/// let tag = "A HREF=\"http://x.org/?a=1&amp;b=2\" TITLE='t'";
/// assert_eq!(get_opt(tag, "href").as_deref(), Some("http://x.org/?a=1&b=2"));
/// assert_eq!(get_opt(tag, "title").as_deref(), Some("t"));
/// assert_eq!(get_opt(tag, "target"), None);
/// ```
pub fn get_opt(tag: &str, name: &str) -> Option<String> {
    let bytes = tag.as_bytes();
    let mut cursor = Cursor::new(bytes);

    loop {
        if cursor.is_eof() {
            return None;
        }
        if attr_starts_here(&cursor, name) {
            break;
        }
        let mut quoted = false;
        cursor.skip_while(|b| {
            if b == b'"' {
                quoted = !quoted;
            }
            quoted || b != b' '
        });
        cursor.skip_while(|b| b == b' ');
    }

    cursor.advance(name.len() + 1);
    let raw = match cursor.peek() {
        Some(q @ (b'"' | b'\'')) => {
            cursor.bump();
            let start = cursor.offset();
            let len = cursor.find(q)?;
            &tag[start..start + len]
        }
        _ => {
            let start = cursor.offset();
            cursor.skip_while(|b| !b.is_ascii_whitespace());
            &tag[start..cursor.offset()]
        }
    };

    Some(entity::unescape(raw).into_owned())
}

/// `name=` at the cursor, ignoring case.
fn attr_starts_here(cursor: &Cursor<'_>, name: &str) -> bool {
    cursor.starts_with_ignore_case(name.as_bytes()) && cursor.peek_ahead(name.len()) == Some(b'=')
}
