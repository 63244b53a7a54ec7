//! Markup formatter: turns markup into styled text in an [`Editor`].
//!
//! The input is scanned once, left to right. Plain text accumulates in a
//! pending buffer that is flushed into the editor whenever a tag changes
//! the formatting, so every flush is styled by the edit state current at
//! that point. Nothing here fails: malformed markup becomes literal text.
//!
//! Boolean tags are counted, so `<b><b>x</b>y</b>` keeps `y` bold and a
//! stray `</b>` does nothing. `<font>` and `<span>` share one stack of
//! records; each record inherits what it does not set from its parent, and
//! closing one restores the parent's values.

use crate::buffer::{InlineObject, StyledTextSink};
use crate::css::{self, FontWeight, TextDecoration};
use crate::editor::Editor;
use crate::entity;
use crate::limits::MAX_SIZE_ATTRIBUTE;
use crate::style::{StyleKind, DEFAULT_FONT_SIZE, MAX_FONT_SIZE};
use crate::tag::{next_tag, TagKind, TagToken};
use crate::{Formats, Options};

/// One `<font>` or styled `<span>` level.
#[derive(Debug, Clone, Default, PartialEq)]
struct FontRecord {
    face: Option<String>,
    fore: Option<String>,
    back: Option<String>,
    /// 0 when no size was given at this level or above.
    size: u8,
    /// Smiley dialect.
    sml: Option<String>,
    /// CSS bold level; bold when positive.
    bold: u8,
    underline: bool,
    strike: bool,
}

/// Open-tag counters for the boolean styles, indexed like [`StyleKind::BOOLEAN`].
#[derive(Debug, Default)]
struct Counters([u32; 8]);

impl Counters {
    fn slot(kind: StyleKind) -> usize {
        StyleKind::BOOLEAN
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0)
    }

    fn get(&self, kind: StyleKind) -> u32 {
        self.0[Self::slot(kind)]
    }

    fn inc(&mut self, kind: StyleKind) -> u32 {
        let c = &mut self.0[Self::slot(kind)];
        *c = c.saturating_add(1);
        *c
    }

    /// Decrement, returning `None` when nothing was open.
    fn dec(&mut self, kind: StyleKind) -> Option<u32> {
        let c = &mut self.0[Self::slot(kind)];
        *c = c.checked_sub(1)?;
        Some(*c)
    }
}

struct Formatter<'e, S: StyledTextSink> {
    editor: &'e mut Editor<S>,
    options: Options,
    pending: String,
    counters: Counters,
    fonts: Vec<FontRecord>,
    /// Font values in effect at the caret before parsing started.
    base: FontRecord,
    /// The last thing seen was `<br>`.
    after_br: bool,
}

impl<S: StyledTextSink> Editor<S> {
    /// Parse `markup` and insert the result at the caret.
    ///
    /// A non-empty selection is replaced. Unless whole-buffer formatting is
    /// on, every style is closed at the end of the input, so the markup
    /// cannot leak formatting into text typed afterwards.
    pub fn insert_html(&mut self, markup: &str, options: Options) {
        self.delete_selection();
        self.smileys_this_insert = 0;
        tracing::trace!(len = markup.len(), "insert_html");

        let base = FontRecord {
            face: self.edit.fontface.clone(),
            fore: self.edit.forecolor.clone(),
            back: self.edit.backcolor.clone(),
            size: self.edit.fontsize,
            ..FontRecord::default()
        };
        let mut formatter = Formatter {
            editor: self,
            options,
            pending: String::new(),
            counters: Counters::default(),
            fonts: Vec::new(),
            base,
            after_br: false,
        };
        formatter.run(markup);
    }
}

impl<S: StyledTextSink> Formatter<'_, S> {
    fn run(&mut self, input: &str) {
        let bytes = input.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let rest = &input[pos..];
            let b = bytes[pos];

            if b == b'<' {
                if let Some(tag) = next_tag(&rest[1..]) {
                    self.after_br = false;
                    self.handle_tag(&tag);
                    pos += 1 + tag.len;
                    continue;
                }
            }

            if let Some(len) = self.match_smiley(rest) {
                self.after_br = false;
                self.flush();
                let dialect = self.dialect();
                self.editor
                    .insert_smiley_at_caret(dialect.as_deref(), &rest[..len]);
                pos += len;
                continue;
            }

            if b == b'&' {
                if let Some((ch, len)) = entity::resolve(rest.as_bytes()) {
                    self.after_br = false;
                    self.push_char(ch);
                    pos += len;
                    continue;
                }
            }

            if b == b'\n' {
                if !self.options.no_newline {
                    self.push_char('\n');
                } else if !self.after_br {
                    self.push_char(' ');
                }
                pos += 1;
                continue;
            }

            let at_word_start = pos == 0
                || self.pending.is_empty()
                || bytes[pos - 1].is_ascii_whitespace();
            if at_word_start {
                if let Some(len) = self.auto_link(rest) {
                    self.after_br = false;
                    pos += len;
                    continue;
                }
            }

            let ch_len = rest.chars().next().map_or(1, char::len_utf8);
            self.after_br = false;
            self.push_str(&rest[..ch_len]);
            pos += ch_len;
        }

        self.flush();
        if !self.editor.wbfo {
            self.editor.close_tags();
        }
    }

    // Text

    fn dropping_text(&self) -> bool {
        self.options.no_title && self.counters.get(StyleKind::Title) > 0
    }

    fn push_char(&mut self, ch: char) {
        if !self.dropping_text() {
            self.pending.push(ch);
        }
    }

    fn push_str(&mut self, text: &str) {
        if !self.dropping_text() {
            self.pending.push_str(text);
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.editor.insert_at_caret(&text);
        }
    }

    fn allowed(&self, format: Formats) -> bool {
        self.editor.format_functions.contains(format)
    }

    // Smileys and links

    fn dialect(&self) -> Option<String> {
        self.fonts
            .last()
            .and_then(|f| f.sml.clone())
            .or_else(|| self.editor.protocol_name.clone())
    }

    fn match_smiley(&self, rest: &str) -> Option<usize> {
        if self.editor.edit.link.is_some()
            || self.options.no_smiley
            || self.dropping_text()
            || self.editor.smileys.is_empty()
        {
            return None;
        }
        let dialect = self.dialect();
        let len = self.editor.smileys.longest_match(dialect.as_deref(), rest);
        (len > 0).then_some(len)
    }

    /// Turn a bare URL at the start of `rest` into a link.
    ///
    /// Returns the bytes consumed, or `None` when `rest` does not start with
    /// a registered scheme followed by URL text.
    fn auto_link(&mut self, rest: &str) -> Option<usize> {
        let scheme = self.editor.protocols.match_prefix(rest);
        if scheme == 0 {
            return None;
        }
        let after = &rest[scheme..];
        match after.as_bytes().first() {
            None => return None,
            Some(b) if b.is_ascii_whitespace() => return None,
            Some(b'<') if next_tag(&after[1..]).is_some() => return None,
            Some(_) => {}
        }

        self.flush();
        if self.editor.edit.link.is_some() || !self.allowed(Formats::LINK) || self.dropping_text() {
            self.push_str(&rest[..scheme]);
            return Some(scheme);
        }

        let bytes = rest.as_bytes();
        let mut end = scheme;
        let mut url = String::from(&rest[..scheme]);
        while end < bytes.len() {
            let b = bytes[end];
            if b.is_ascii_whitespace() || (b == b'<' && next_tag(&rest[end + 1..]).is_some()) {
                break;
            }
            if b == b'&' {
                if let Some((ch, len)) = entity::resolve(&bytes[end..]) {
                    url.push(ch);
                    end += len;
                    continue;
                }
            }
            let ch_len = rest[end..].chars().next().map_or(1, char::len_utf8);
            url.push_str(&rest[end..end + ch_len]);
            end += ch_len;
        }

        self.editor.resume_link(&url);
        self.editor.insert_at_caret(&url);
        self.editor.toggle_link(None);
        Some(end)
    }

    // Tags

    fn handle_tag(&mut self, tag: &TagToken<'_>) {
        use TagKind::*;

        match tag.kind {
            Bold => self.open_flag(StyleKind::Bold, Formats::BOLD),
            Italic => self.open_flag(StyleKind::Italic, Formats::ITALIC),
            Underline => self.open_flag(StyleKind::Underline, Formats::UNDERLINE),
            Strike => self.open_flag(StyleKind::Strike, Formats::STRIKE),
            Sub => self.open_flag(StyleKind::Sub, Formats::NONE),
            Sup => self.open_flag(StyleKind::Sup, Formats::NONE),
            Pre => self.open_flag(StyleKind::Pre, Formats::NONE),
            Title => self.open_flag(StyleKind::Title, Formats::NONE),
            BoldEnd => self.close_flag(StyleKind::Bold),
            ItalicEnd => self.close_flag(StyleKind::Italic),
            UnderlineEnd => self.close_flag(StyleKind::Underline),
            StrikeEnd => self.close_flag(StyleKind::Strike),
            SubEnd => self.close_flag(StyleKind::Sub),
            SupEnd => self.close_flag(StyleKind::Sup),
            PreEnd => self.close_flag(StyleKind::Pre),
            TitleEnd => self.close_flag(StyleKind::Title),
            Br => {
                self.push_char('\n');
                self.after_br = true;
            }
            Hr => {
                self.flush();
                self.editor.insert_object_at_caret(InlineObject::rule());
            }
            Font => self.open_font(tag),
            Styled => self.open_span(tag),
            FontEnd | SpanEnd => self.close_record(),
            Body => self.open_body(tag),
            BodyEnd => {
                if !self.editor.wbfo {
                    self.flush();
                    self.editor.toggle_background(None);
                }
            }
            Anchor => {
                if let Some(href) = tag.opt("href") {
                    if self.allowed(Formats::LINK) {
                        self.flush();
                        self.editor.resume_link(&href);
                    }
                }
            }
            AnchorEnd => {
                if !self.editor.wbfo && self.editor.edit.link.is_some() {
                    self.flush();
                    self.editor.toggle_link(None);
                }
            }
            Img => self.image(tag),
            Comment => {
                if self.editor.show_comments && !self.options.no_comments {
                    self.flush();
                    self.editor
                        .insert_object_at_caret(InlineObject::comment(tag.text));
                }
            }
            Inert => {}
            Unknown => {
                tracing::debug!(tag = tag.text, "unrecognized tag kept as text");
                self.push_char('<');
                self.push_str(tag.text);
                self.push_char('>');
            }
        }
    }

    /// Whether `kind` should be on given the tag counters and the CSS stack.
    fn wants_flag(&self, kind: StyleKind) -> bool {
        let from_css = self.fonts.last().is_some_and(|f| match kind {
            StyleKind::Bold => f.bold > 0,
            StyleKind::Underline => f.underline,
            StyleKind::Strike => f.strike,
            _ => false,
        });
        self.counters.get(kind) > 0 || from_css
    }

    fn flag_format(kind: StyleKind) -> Formats {
        match kind {
            StyleKind::Bold => Formats::BOLD,
            StyleKind::Italic => Formats::ITALIC,
            StyleKind::Underline => Formats::UNDERLINE,
            StyleKind::Strike => Formats::STRIKE,
            _ => Formats::NONE,
        }
    }

    /// Bring the editor's flag for `kind` in line with [`Self::wants_flag`].
    fn sync_flag(&mut self, kind: StyleKind) {
        if !self.allowed(Self::flag_format(kind)) {
            return;
        }
        let want = self.wants_flag(kind);
        if self.editor.edit.flag(kind) != want {
            self.editor.set_flag(kind, want);
        }
    }

    fn open_flag(&mut self, kind: StyleKind, format: Formats) {
        if self.options.no_formatting && kind != StyleKind::Title {
            return;
        }
        self.flush();
        self.counters.inc(kind);
        if self.allowed(format) {
            self.sync_flag(kind);
        }
    }

    fn close_flag(&mut self, kind: StyleKind) {
        if self.editor.wbfo || (self.options.no_formatting && kind != StyleKind::Title) {
            return;
        }
        self.flush();
        if self.counters.dec(kind).is_some() {
            self.sync_flag(kind);
        }
    }

    fn parent(&self) -> FontRecord {
        self.fonts.last().cloned().unwrap_or_else(|| self.base.clone())
    }

    fn open_font(&mut self, tag: &TagToken<'_>) {
        let color = tag.opt("color");
        let back = tag.opt("back");
        let face = tag.opt("face");
        let size = tag.opt("size");
        let sml = tag.opt("sml");
        if color.is_none() && back.is_none() && face.is_none() && size.is_none() && sml.is_none() {
            return;
        }

        self.flush();
        let parent = self.parent();
        let mut record = parent.clone();

        if let Some(color) = color.filter(|_| self.colours_allowed(Formats::FORECOLOR)) {
            record.fore = Some(css::normalize_color(&color));
        }
        if let Some(back) = back.filter(|_| self.colours_allowed(Formats::BACKCOLOR)) {
            record.back = Some(css::normalize_color(&back));
        }
        if let Some(face) = face.filter(|_| !self.options.no_fonts && self.allowed(Formats::FACE)) {
            record.face = Some(face);
        }
        if let Some(size) = size.filter(|_| !self.options.no_sizes) {
            if let Some(size) = parse_size_attribute(&size) {
                record.size = size;
            }
        }
        if let Some(sml) = sml {
            record.sml = Some(sml);
        }

        self.fonts.push(record.clone());
        self.apply_record(&parent, &record);
    }

    fn open_span(&mut self, tag: &TagToken<'_>) {
        let Some(style) = tag.opt("style") else {
            return;
        };
        let color = css::property(&style, "color");
        let background = css::property(&style, "background");
        let family = css::property(&style, "font-family");
        let size = css::property(&style, "font-size");
        let decoration = css::property(&style, "text-decoration");
        let weight = css::property(&style, "font-weight");
        if [color, background, family, size, decoration, weight]
            .iter()
            .all(Option::is_none)
        {
            return;
        }

        self.flush();
        let parent = self.parent();
        let mut record = parent.clone();

        if let Some(color) = color.filter(|_| self.colours_allowed(Formats::FORECOLOR)) {
            record.fore = Some(css::normalize_color(color));
        }
        if let Some(bg) = background.filter(|_| self.colours_allowed(Formats::BACKCOLOR)) {
            record.back = Some(css::normalize_color(bg));
        }
        if let Some(family) = family.filter(|_| !self.options.no_fonts && self.allowed(Formats::FACE)) {
            let family = family.trim_matches(|c| c == '"' || c == '\'');
            if !family.is_empty() {
                record.face = Some(family.to_string());
            }
        }
        if let Some(size) = size.filter(|_| !self.options.no_sizes) {
            record.size = css::font_size(size);
        }
        if let Some(decoration) = decoration.and_then(TextDecoration::parse) {
            match decoration {
                TextDecoration::Underline => record.underline = true,
                TextDecoration::LineThrough => record.strike = true,
            }
        }
        if let Some(weight) = weight {
            record.bold = FontWeight::parse(weight).apply(parent.bold);
        }

        self.fonts.push(record.clone());
        self.apply_record(&parent, &record);
    }

    fn open_body(&mut self, tag: &TagToken<'_>) {
        let Some(color) = tag.opt("bgcolor") else {
            return;
        };
        if self.colours_allowed(Formats::BACKGROUND) {
            self.flush();
            self.editor.toggle_background(Some(&color));
        }
    }

    fn close_record(&mut self) {
        if self.editor.wbfo || self.fonts.is_empty() {
            return;
        }
        self.flush();
        if let Some(record) = self.fonts.pop() {
            let parent = self.parent();
            self.apply_record(&record, &parent);
        }
    }

    fn colours_allowed(&self, format: Formats) -> bool {
        !self.options.no_colours && self.allowed(format)
    }

    /// Move the edit state from what `from` set to what `to` sets.
    fn apply_record(&mut self, from: &FontRecord, to: &FontRecord) {
        if from.face != to.face {
            self.editor.toggle_fontface(to.face.as_deref());
        }
        if from.fore != to.fore {
            self.editor.toggle_forecolor(to.fore.as_deref());
        }
        if from.back != to.back {
            self.editor.toggle_backcolor(to.back.as_deref());
        }
        if from.size != to.size && self.editor.format_functions.intersects(Formats::GROW | Formats::SHRINK) {
            self.editor.font_set_size(to.size);
        }
        for kind in [StyleKind::Bold, StyleKind::Underline, StyleKind::Strike] {
            self.sync_flag(kind);
        }
    }

    fn image(&mut self, tag: &TagToken<'_>) {
        if !self.allowed(Formats::IMAGE) {
            return;
        }
        if let Some(id) = tag.opt("id") {
            self.flush();
            if let Some(id) = parse_leading_int(&id).and_then(|n| u32::try_from(n).ok()) {
                self.editor.insert_image_at_caret(id);
            }
            return;
        }

        let Some(src) = tag.opt("src") else {
            return;
        };
        let text = tag.opt("alt").filter(|a| !a.is_empty()).unwrap_or_else(|| src.clone());
        self.flush();
        if self.editor.edit.link.is_none() && self.allowed(Formats::LINK) {
            self.editor.resume_link(&src);
            self.editor.insert_at_caret(&text);
            self.editor.toggle_link(None);
        } else {
            self.editor.insert_at_caret(&text);
        }
    }
}

/// Leading optional sign and digits, saturating.
fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => (-1, &value[1..]),
        Some(b'+') => (1, &value[1..]),
        _ => (1, value),
    };
    let n = digits.bytes().take_while(u8::is_ascii_digit).try_fold(0i64, |acc, d| {
        Some(acc.saturating_mul(10).saturating_add(i64::from(d - b'0')))
    });
    match n {
        Some(n) if digits.as_bytes().first().is_some_and(u8::is_ascii_digit) => Some(sign * n),
        _ => None,
    }
}

/// `SIZE` attribute of `<font>`: `+N` and `-N` are relative to the default
/// size 3, plain digits are absolute. The result is clamped to 0..=7,
/// where 0 leaves the text unsized.
fn parse_size_attribute(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let n = parse_leading_int(trimmed)?.min(i64::from(MAX_SIZE_ATTRIBUTE));
    let size = match trimmed.as_bytes().first() {
        Some(b'+') | Some(b'-') => i64::from(DEFAULT_FONT_SIZE) + n,
        _ => n,
    };
    Some(size.clamp(0, i64::from(MAX_FONT_SIZE)) as u8)
}
