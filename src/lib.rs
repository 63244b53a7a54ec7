//! imhtml: rich-text markup engine for instant-messaging conversations
//!
//! Parses the small HTML dialect IM clients exchange (`<b>`, `<font>`,
//! `<a>`, CSS `<span>`s, smileys, entities, bare URLs) into a styled-text
//! buffer, and serializes the buffer back into balanced markup or plain
//! text.
//!
//! # Design Principles
//! - Single left-to-right pass: no DOM, no backtracking
//! - Never fails on input: anything unrecognized is kept as literal text
//! - The text model sits behind a trait, so hosts can bring their own
//! - Overlapping style runs are re-nested only at serialization time

pub mod buffer;
pub mod css;
pub mod cursor;
pub mod editor;
pub mod entity;
pub mod error;
pub mod escape;
mod format;
pub mod image;
pub mod limits;
pub mod protocol;
pub mod range;
pub mod render;
pub mod smiley;
pub mod style;
pub mod tag;

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

// Re-export primary types
pub use buffer::{InlineObject, ObjectKind, Slot, StyledTextSink, TextBuffer};
pub use editor::{ActiveLink, EditState, Editor};
pub use error::{Error, Result};
pub use image::{ImageHandle, ImageProvider};
pub use protocol::ProtocolRegistry;
pub use range::Range;
pub use render::MarkupWriter;
pub use smiley::{SmileyHandle, SmileyRegistry};
pub use style::{Style, StyleKind, StyleRun};

/// Per-insertion parsing options. Everything is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Ignore `<b>`, `<i>`, `<u>`, `<s>`, `<sub>`, `<sup>` and `<pre>`.
    pub no_formatting: bool,
    /// Ignore text and background colours.
    pub no_colours: bool,
    /// Ignore font faces.
    pub no_fonts: bool,
    /// Ignore font sizes.
    pub no_sizes: bool,
    /// Drop `<!-- -->` comments.
    pub no_comments: bool,
    /// Drop the text inside `<title>`.
    pub no_title: bool,
    /// Treat newlines in the source as spaces, except right after `<br>`.
    pub no_newline: bool,
    /// Do not recognize smileys.
    pub no_smiley: bool,
}

/// Set of formatting features an editor accepts from markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Formats(u32);

impl Formats {
    pub const NONE: Formats = Formats(0);
    pub const BOLD: Formats = Formats(1 << 0);
    pub const ITALIC: Formats = Formats(1 << 1);
    pub const UNDERLINE: Formats = Formats(1 << 2);
    pub const STRIKE: Formats = Formats(1 << 3);
    pub const GROW: Formats = Formats(1 << 4);
    pub const SHRINK: Formats = Formats(1 << 5);
    pub const FACE: Formats = Formats(1 << 6);
    pub const FORECOLOR: Formats = Formats(1 << 7);
    pub const BACKCOLOR: Formats = Formats(1 << 8);
    pub const BACKGROUND: Formats = Formats(1 << 9);
    pub const LINK: Formats = Formats(1 << 10);
    pub const IMAGE: Formats = Formats(1 << 11);
    pub const SMILEY: Formats = Formats(1 << 12);
    pub const ALL: Formats = Formats((1 << 13) - 1);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Every feature in `other` is enabled.
    #[inline]
    pub const fn contains(self, other: Formats) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one feature in `other` is enabled.
    #[inline]
    pub const fn intersects(self, other: Formats) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Formats {
    fn default() -> Self {
        Formats::ALL
    }
}

impl BitOr for Formats {
    type Output = Formats;

    fn bitor(self, rhs: Formats) -> Formats {
        Formats(self.0 | rhs.0)
    }
}

impl BitOrAssign for Formats {
    fn bitor_assign(&mut self, rhs: Formats) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Formats {
    type Output = Formats;

    fn bitand(self, rhs: Formats) -> Formats {
        Formats(self.0 & rhs.0)
    }
}

impl Not for Formats {
    type Output = Formats;

    fn not(self) -> Formats {
        Formats(!self.0 & Formats::ALL.0)
    }
}

/// Parse markup and serialize it back in canonical form.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let markup = imhtml::to_markup("<STRONG>hi</STRONG> <font color=red>you</font>");
/// assert_eq!(markup, "<b>hi</b> <font color=\"#ff0000\">you</font>");
/// ```
pub fn to_markup(input: &str) -> String {
    to_markup_with_options(input, Options::default())
}

/// Parse markup with options and serialize it back.
pub fn to_markup_with_options(input: &str, options: Options) -> String {
    let mut editor = Editor::new();
    editor.insert_html(input, options);
    editor.get_markup()
}

/// Parse markup and return its plain text.
///
/// # Example
/// ```
/// assert_eq!(imhtml::to_text("<b>a</b> &amp; <i>b</i>"), "a & b");
/// ```
pub fn to_text(input: &str) -> String {
    to_text_with_options(input, Options::default())
}

/// Parse markup with options and return its plain text.
pub fn to_text_with_options(input: &str, options: Options) -> String {
    let mut editor = Editor::new();
    editor.insert_html(input, options);
    editor.text()
}
