//! Style kinds and their markup representation.

use crate::escape::escape_attr_into;
use crate::range::Range;

/// Largest value on the HTML font-size scale.
pub const MAX_FONT_SIZE: u8 = 7;

/// Size used when no size run applies.
pub const DEFAULT_FONT_SIZE: u8 = 3;

/// Point-size scale factor for each font size (index 0 is size 1).
pub const FONT_SCALE: [f64; MAX_FONT_SIZE as usize] = [0.85, 0.95, 1.0, 1.2, 1.44, 1.728, 2.0736];

/// Scale factor for a font size, or `None` outside 1..=7.
pub fn font_scale(size: u8) -> Option<f64> {
    FONT_SCALE.get(usize::from(size).checked_sub(1)?).copied()
}

/// Kind of a style, without its parameter.
///
/// The declaration order is the order in which runs that begin at the same
/// position and share an end are opened by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKind {
    Link,
    Background,
    FontFace,
    FontSize,
    ForeColor,
    BackColor,
    Bold,
    Italic,
    Underline,
    Strike,
    Sub,
    Sup,
    Pre,
    Title,
}

impl StyleKind {
    /// Kinds without a parameter.
    pub const BOOLEAN: [StyleKind; 8] = [
        StyleKind::Bold,
        StyleKind::Italic,
        StyleKind::Underline,
        StyleKind::Strike,
        StyleKind::Sub,
        StyleKind::Sup,
        StyleKind::Pre,
        StyleKind::Title,
    ];

    #[inline]
    pub fn is_boolean(self) -> bool {
        Self::BOOLEAN.contains(&self)
    }

    /// The parameterless style for a boolean kind.
    pub fn boolean_style(self) -> Option<Style> {
        Some(match self {
            StyleKind::Bold => Style::Bold,
            StyleKind::Italic => Style::Italic,
            StyleKind::Underline => Style::Underline,
            StyleKind::Strike => Style::Strike,
            StyleKind::Sub => Style::Sub,
            StyleKind::Sup => Style::Sup,
            StyleKind::Pre => Style::Pre,
            StyleKind::Title => Style::Title,
            _ => return None,
        })
    }
}

/// Identifier of a hyperlink, unique within one editing session.
pub type LinkId = u32;

/// A style kind together with its parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Strike,
    Sub,
    Sup,
    Pre,
    Title,
    ForeColor(String),
    BackColor(String),
    Background(String),
    FontFace(String),
    /// 1..=7
    FontSize(u8),
    Link { id: LinkId, url: String },
}

impl Style {
    pub fn kind(&self) -> StyleKind {
        match self {
            Style::Bold => StyleKind::Bold,
            Style::Italic => StyleKind::Italic,
            Style::Underline => StyleKind::Underline,
            Style::Strike => StyleKind::Strike,
            Style::Sub => StyleKind::Sub,
            Style::Sup => StyleKind::Sup,
            Style::Pre => StyleKind::Pre,
            Style::Title => StyleKind::Title,
            Style::ForeColor(_) => StyleKind::ForeColor,
            Style::BackColor(_) => StyleKind::BackColor,
            Style::Background(_) => StyleKind::Background,
            Style::FontFace(_) => StyleKind::FontFace,
            Style::FontSize(_) => StyleKind::FontSize,
            Style::Link { .. } => StyleKind::Link,
        }
    }

    /// Write the opening tag.
    pub fn write_open(&self, out: &mut String) {
        let (prefix, value) = match self {
            Style::Bold => return out.push_str("<b>"),
            Style::Italic => return out.push_str("<i>"),
            Style::Underline => return out.push_str("<u>"),
            Style::Strike => return out.push_str("<s>"),
            Style::Sub => return out.push_str("<sub>"),
            Style::Sup => return out.push_str("<sup>"),
            Style::Pre => return out.push_str("<pre>"),
            Style::Title => return out.push_str("<title>"),
            Style::FontSize(size) => {
                out.push_str("<font size=\"");
                out.push(char::from(b'0' + (*size).min(MAX_FONT_SIZE)));
                out.push_str("\">");
                return;
            }
            Style::ForeColor(c) => ("<font color=\"", c),
            Style::BackColor(c) => ("<font back=\"", c),
            Style::FontFace(f) => ("<font face=\"", f),
            Style::Background(c) => ("<body bgcolor=\"", c),
            Style::Link { url, .. } => ("<a href=\"", url),
        };
        out.push_str(prefix);
        escape_attr_into(out, value);
        out.push_str("\">");
    }

    /// The closing tag.
    pub fn close_tag(&self) -> &'static str {
        match self {
            Style::Bold => "</b>",
            Style::Italic => "</i>",
            Style::Underline => "</u>",
            Style::Strike => "</s>",
            Style::Sub => "</sub>",
            Style::Sup => "</sup>",
            Style::Pre => "</pre>",
            Style::Title => "</title>",
            Style::ForeColor(_) | Style::BackColor(_) | Style::FontFace(_) | Style::FontSize(_) => {
                "</font>"
            }
            Style::Background(_) => "</body>",
            Style::Link { .. } => "</a>",
        }
    }

    /// Opening tag as a new string.
    pub fn open_tag(&self) -> String {
        let mut out = String::new();
        self.write_open(&mut out);
        out
    }
}

/// A style applied over a range of buffer positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleRun {
    pub style: Style,
    pub range: Range,
}

impl StyleRun {
    pub fn new(style: Style, range: impl Into<Range>) -> Self {
        Self {
            style,
            range: range.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> StyleKind {
        self.style.kind()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.range.start_usize()
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.range.end_usize()
    }
}
