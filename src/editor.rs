//! Editing session over a styled-text buffer.
//!
//! An [`Editor`] owns the buffer, the caret, the active formatting
//! ([`EditState`]) and the registries used while inserting markup. Style
//! toggles update the edit state and apply to the *formatting bounds*: the
//! whole buffer when whole-buffer formatting is on, otherwise the selection
//! (which is empty at a bare caret). Inserted text takes its styles from
//! the edit state.

use rustc_hash::FxHashMap;

use crate::buffer::{InlineObject, StyledTextSink, TextBuffer};
use crate::css::normalize_color;
use crate::error::{check_range, Error, Result};
use crate::image::{self, ImageProvider};
use crate::limits::{MAX_SMILEYS_PER_INSERT, MAX_SMILEYS_TOTAL};
use crate::protocol::ProtocolRegistry;
use crate::range::Range;
use crate::render;
use crate::smiley::SmileyRegistry;
use crate::style::{LinkId, Style, StyleKind, MAX_FONT_SIZE};
use crate::{entity, Formats};

/// A hyperlink that new text is inserted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLink {
    pub id: LinkId,
    pub url: String,
}

/// The formatting applied to newly inserted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub sub: bool,
    pub sup: bool,
    pub pre: bool,
    pub title: bool,
    pub fontface: Option<String>,
    pub forecolor: Option<String>,
    pub backcolor: Option<String>,
    pub background: Option<String>,
    /// 0 when unset, otherwise 1..=7.
    pub fontsize: u8,
    pub link: Option<ActiveLink>,
}

impl EditState {
    pub(crate) fn flag(&self, kind: StyleKind) -> bool {
        match kind {
            StyleKind::Bold => self.bold,
            StyleKind::Italic => self.italic,
            StyleKind::Underline => self.underline,
            StyleKind::Strike => self.strike,
            StyleKind::Sub => self.sub,
            StyleKind::Sup => self.sup,
            StyleKind::Pre => self.pre,
            StyleKind::Title => self.title,
            _ => false,
        }
    }

    fn flag_mut(&mut self, kind: StyleKind) -> Option<&mut bool> {
        Some(match kind {
            StyleKind::Bold => &mut self.bold,
            StyleKind::Italic => &mut self.italic,
            StyleKind::Underline => &mut self.underline,
            StyleKind::Strike => &mut self.strike,
            StyleKind::Sub => &mut self.sub,
            StyleKind::Sup => &mut self.sup,
            StyleKind::Pre => &mut self.pre,
            StyleKind::Title => &mut self.title,
            _ => return None,
        })
    }

    fn value_mut(&mut self, kind: StyleKind) -> Option<&mut Option<String>> {
        Some(match kind {
            StyleKind::FontFace => &mut self.fontface,
            StyleKind::ForeColor => &mut self.forecolor,
            StyleKind::BackColor => &mut self.backcolor,
            StyleKind::Background => &mut self.background,
            _ => return None,
        })
    }

    /// The value styles to give inserted text, in kind order.
    fn value_styles(&self) -> [(StyleKind, Option<Style>); 6] {
        [
            (
                StyleKind::Link,
                self.link.as_ref().map(|l| Style::Link {
                    id: l.id,
                    url: l.url.clone(),
                }),
            ),
            (StyleKind::Background, self.background.clone().map(Style::Background)),
            (StyleKind::FontFace, self.fontface.clone().map(Style::FontFace)),
            (
                StyleKind::FontSize,
                (self.fontsize > 0).then_some(Style::FontSize(self.fontsize)),
            ),
            (StyleKind::ForeColor, self.forecolor.clone().map(Style::ForeColor)),
            (StyleKind::BackColor, self.backcolor.clone().map(Style::BackColor)),
        ]
    }
}

/// An editing session.
///
/// # Example
/// ```
/// use imhtml::{Editor, Options};
///
/// let mut editor = Editor::new();
/// editor.insert_html("<b>hi</b> there", Options::default());
/// assert_eq!(editor.text(), "hi there");
/// assert_eq!(editor.get_markup(), "<b>hi</b> there");
/// ```
pub struct Editor<S: StyledTextSink = TextBuffer> {
    pub(crate) buffer: S,
    pub(crate) caret: usize,
    pub(crate) selection: Option<Range>,
    pub(crate) edit: EditState,
    pub(crate) wbfo: bool,
    pub(crate) show_comments: bool,
    pub(crate) protocol_name: Option<String>,
    pub(crate) format_functions: Formats,
    pub(crate) smileys: SmileyRegistry,
    pub(crate) protocols: ProtocolRegistry,
    pub(crate) images: Option<Box<dyn ImageProvider>>,
    links: FxHashMap<LinkId, String>,
    next_link_id: LinkId,
    pub(crate) smileys_this_insert: usize,
    smileys_total: usize,
}

impl Default for Editor<TextBuffer> {
    fn default() -> Self {
        Self::with_buffer(TextBuffer::new())
    }
}

impl Editor<TextBuffer> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: StyledTextSink> Editor<S> {
    /// Start a session over an existing buffer. The caret is placed at the end.
    pub fn with_buffer(buffer: S) -> Self {
        let caret = buffer.len();
        Self {
            buffer,
            caret,
            selection: None,
            edit: EditState::default(),
            wbfo: false,
            show_comments: true,
            protocol_name: None,
            format_functions: Formats::ALL,
            smileys: SmileyRegistry::new(),
            protocols: ProtocolRegistry::default(),
            images: None,
            links: FxHashMap::default(),
            next_link_id: 0,
            smileys_this_insert: 0,
            smileys_total: 0,
        }
    }

    pub fn buffer(&self) -> &S {
        &self.buffer
    }

    pub fn into_buffer(self) -> S {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    // Settings

    /// Apply every toggle to the whole buffer instead of the selection.
    pub fn set_whole_buffer_formatting_only(&mut self, wbfo: bool) {
        self.wbfo = wbfo;
    }

    pub fn whole_buffer_formatting_only(&self) -> bool {
        self.wbfo
    }

    pub fn set_show_comments(&mut self, show: bool) {
        self.show_comments = show;
    }

    /// Smiley dialect used when the markup does not name one.
    pub fn set_protocol_name(&mut self, name: Option<&str>) {
        self.protocol_name = name.map(str::to_string);
    }

    pub fn protocol_name(&self) -> Option<&str> {
        self.protocol_name.as_deref()
    }

    pub fn set_format_functions(&mut self, formats: Formats) {
        self.format_functions = formats;
    }

    pub fn format_functions(&self) -> Formats {
        self.format_functions
    }

    pub fn smileys(&self) -> &SmileyRegistry {
        &self.smileys
    }

    pub fn smileys_mut(&mut self) -> &mut SmileyRegistry {
        &mut self.smileys
    }

    pub fn protocols_mut(&mut self) -> &mut ProtocolRegistry {
        &mut self.protocols
    }

    pub fn set_image_provider(&mut self, provider: Option<Box<dyn ImageProvider>>) {
        self.images = provider;
    }

    // Caret and selection

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> Option<Range> {
        self.selection
    }

    /// Move the caret and re-derive the edit state from the text there.
    ///
    /// Inside the text the state reflects the runs covering `pos`; at the
    /// end it reflects the runs ending there, except that a link is never
    /// continued past its end.
    pub fn set_caret(&mut self, pos: usize) -> Result<()> {
        let len = self.buffer.len();
        if pos > len {
            return Err(Error::OutOfBounds { pos, len });
        }
        self.caret = pos;
        self.selection = None;
        if len > 0 {
            self.derive_edit_state(pos);
        }
        Ok(())
    }

    fn derive_edit_state(&mut self, pos: usize) {
        let at_end = pos == self.buffer.len();
        let runs = if at_end {
            self.buffer.styles_ending_at(pos)
        } else {
            self.buffer.styles_at(pos)
        };

        let mut edit = EditState::default();
        for run in runs {
            match &run.style {
                Style::ForeColor(c) => edit.forecolor = Some(c.clone()),
                Style::BackColor(c) => edit.backcolor = Some(c.clone()),
                Style::Background(c) => edit.background = Some(c.clone()),
                Style::FontFace(f) => edit.fontface = Some(f.clone()),
                Style::FontSize(s) => edit.fontsize = *s,
                Style::Link { id, url } if !at_end => {
                    edit.link = Some(ActiveLink {
                        id: *id,
                        url: url.clone(),
                    });
                }
                Style::Link { .. } => {}
                flag => {
                    if let Some(on) = edit.flag_mut(flag.kind()) {
                        *on = true;
                    }
                }
            }
        }
        self.edit = edit;
    }

    /// Select `start..end` and place the caret at `end`.
    ///
    /// The edit state follows the first selected position, so toggles see
    /// what the selection starts with. An empty selection behaves like
    /// [`Self::set_caret`].
    pub fn select(&mut self, start: usize, end: usize) -> Result<()> {
        let len = self.buffer.len();
        check_range(start, end, len)?;
        self.caret = end;
        self.selection = (start < end).then_some(Range::from_usize(start, end));
        if len > 0 {
            self.derive_edit_state(if start < end { start } else { end });
        }
        Ok(())
    }

    /// Where toggles apply.
    fn bounds(&self) -> Range {
        if self.wbfo {
            Range::from_usize(0, self.buffer.len())
        } else {
            self.selection
                .unwrap_or(Range::from_usize(self.caret, self.caret))
        }
    }

    // Queries

    pub fn current_format(&self) -> &EditState {
        &self.edit
    }

    pub fn current_fontface(&self) -> Option<&str> {
        self.edit.fontface.as_deref()
    }

    pub fn current_forecolor(&self) -> Option<&str> {
        self.edit.forecolor.as_deref()
    }

    pub fn current_backcolor(&self) -> Option<&str> {
        self.edit.backcolor.as_deref()
    }

    pub fn current_background(&self) -> Option<&str> {
        self.edit.background.as_deref()
    }

    pub fn current_fontsize(&self) -> u8 {
        self.edit.fontsize
    }

    /// URL of a link created in this session.
    pub fn link_url(&self, id: LinkId) -> Option<&str> {
        self.links.get(&id).map(String::as_str)
    }

    // Toggles

    /// Turn a boolean style on or off and apply it to the formatting bounds.
    pub(crate) fn set_flag(&mut self, kind: StyleKind, on: bool) {
        let Some(flag) = self.edit.flag_mut(kind) else {
            return;
        };
        *flag = on;
        let range = self.bounds();
        match kind.boolean_style() {
            Some(style) if on => self.buffer.apply_style(style, range),
            _ => self.buffer.remove_style(kind, range, false),
        }
    }

    fn toggle_flag(&mut self, kind: StyleKind) -> bool {
        let on = !self.edit.flag(kind);
        self.set_flag(kind, on);
        on
    }

    /// Returns whether bold is now on.
    pub fn toggle_bold(&mut self) -> bool {
        self.toggle_flag(StyleKind::Bold)
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.toggle_flag(StyleKind::Italic)
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.toggle_flag(StyleKind::Underline)
    }

    pub fn toggle_strike(&mut self) -> bool {
        self.toggle_flag(StyleKind::Strike)
    }

    /// Set the font size; 0 unsets it.
    pub fn font_set_size(&mut self, size: u8) {
        self.edit.fontsize = size.min(MAX_FONT_SIZE);
        self.apply_font_size();
    }

    fn apply_font_size(&mut self) {
        let range = self.bounds();
        self.buffer.remove_style(StyleKind::FontSize, range, self.wbfo);
        if self.edit.fontsize > 0 {
            self.buffer
                .apply_style(Style::FontSize(self.edit.fontsize), range);
        }
    }

    /// One step larger; an unset size grows to 4.
    pub fn font_grow(&mut self) {
        match self.edit.fontsize {
            MAX_FONT_SIZE => return,
            0 => self.edit.fontsize = 4,
            _ => self.edit.fontsize += 1,
        }
        self.apply_font_size();
    }

    /// One step smaller; an unset size shrinks to 2.
    pub fn font_shrink(&mut self) {
        match self.edit.fontsize {
            1 => return,
            0 => self.edit.fontsize = 2,
            _ => self.edit.fontsize -= 1,
        }
        self.apply_font_size();
    }

    /// Set or clear a string-valued style. Returns whether it is now set.
    fn toggle_value(&mut self, kind: StyleKind, value: Option<&str>) -> bool {
        let value = value.filter(|v| !v.is_empty()).map(|v| match kind {
            StyleKind::FontFace => v.to_string(),
            _ => normalize_color(v),
        });
        let range = self.bounds();

        match value {
            Some(value) => {
                self.buffer.remove_style(kind, range, self.wbfo);
                let style = match kind {
                    StyleKind::FontFace => Style::FontFace(value.clone()),
                    StyleKind::ForeColor => Style::ForeColor(value.clone()),
                    StyleKind::BackColor => Style::BackColor(value.clone()),
                    _ => Style::Background(value.clone()),
                };
                self.buffer.apply_style(style, range);
                if let Some(slot) = self.edit.value_mut(kind) {
                    *slot = Some(value);
                }
                true
            }
            None => {
                self.buffer.remove_style(kind, range, true);
                if let Some(slot) = self.edit.value_mut(kind) {
                    *slot = None;
                }
                false
            }
        }
    }

    pub fn toggle_forecolor(&mut self, color: Option<&str>) -> bool {
        self.toggle_value(StyleKind::ForeColor, color)
    }

    pub fn toggle_backcolor(&mut self, color: Option<&str>) -> bool {
        self.toggle_value(StyleKind::BackColor, color)
    }

    pub fn toggle_background(&mut self, color: Option<&str>) -> bool {
        self.toggle_value(StyleKind::Background, color)
    }

    pub fn toggle_fontface(&mut self, face: Option<&str>) -> bool {
        self.toggle_value(StyleKind::FontFace, face)
    }

    /// Start a new link for subsequent text, or end the current one.
    ///
    /// A non-empty selection is turned into the link immediately.
    pub fn toggle_link(&mut self, url: Option<&str>) -> Option<LinkId> {
        self.edit.link = None;
        let url = url?;

        let id = self.next_link_id;
        self.next_link_id += 1;
        self.links.insert(id, url.to_string());
        tracing::debug!(id, url, "link created");

        if let Some(range) = self.selection {
            self.buffer.remove_style(StyleKind::Link, range, false);
            self.buffer.apply_style(
                Style::Link {
                    id,
                    url: url.to_string(),
                },
                range,
            );
        }
        self.edit.link = Some(ActiveLink {
            id,
            url: url.to_string(),
        });
        Some(id)
    }

    /// Open a link for parsed markup. A link run with the same URL ending at
    /// the caret keeps its id, so an anchor the serializer had to split
    /// comes back as one link.
    pub(crate) fn resume_link(&mut self, url: &str) -> Option<LinkId> {
        if self.selection.is_none() {
            let caret = self.caret;
            let previous = self
                .buffer
                .styles_ending_at(caret)
                .into_iter()
                .find_map(|run| match &run.style {
                    Style::Link { id, url: u } if u == url => Some(*id),
                    _ => None,
                });
            if let Some(id) = previous {
                self.edit.link = Some(ActiveLink {
                    id,
                    url: url.to_string(),
                });
                return Some(id);
            }
        }
        self.toggle_link(Some(url))
    }

    /// Strip every style from the formatting bounds and reset the edit state.
    pub fn clear_formatting(&mut self) {
        let range = self.bounds();
        for kind in [
            StyleKind::Link,
            StyleKind::Background,
            StyleKind::FontFace,
            StyleKind::FontSize,
            StyleKind::ForeColor,
            StyleKind::BackColor,
        ]
        .into_iter()
        .chain(StyleKind::BOOLEAN)
        {
            self.buffer.remove_style(kind, range, false);
        }
        self.edit = EditState::default();
    }

    /// End every active style so that following text is unformatted.
    pub fn close_tags(&mut self) {
        for kind in StyleKind::BOOLEAN {
            if self.edit.flag(kind) {
                self.set_flag(kind, false);
            }
        }
        for kind in [StyleKind::ForeColor, StyleKind::BackColor, StyleKind::FontFace] {
            if self.edit.value_mut(kind).is_some_and(|v| v.is_some()) {
                self.toggle_value(kind, None);
            }
        }
        self.edit.fontsize = 0;
        if self.edit.link.is_some() {
            self.toggle_link(None);
        }
    }

    // Insertion

    /// Style `range` of freshly inserted content from the edit state.
    ///
    /// Runs the content landed inside are cut back wherever the edit state
    /// has the style off or unset.
    fn apply_tags_on_insert(&mut self, range: Range) {
        for kind in StyleKind::BOOLEAN {
            match kind.boolean_style() {
                Some(style) if self.edit.flag(kind) => self.buffer.apply_style(style, range),
                _ => self.buffer.remove_style(kind, range, false),
            }
        }
        for (kind, style) in self.edit.value_styles() {
            match style {
                Some(style) => {
                    self.buffer.remove_style(kind, range, true);
                    self.buffer.apply_style(style, range);
                }
                None => self.buffer.remove_style(kind, range, false),
            }
        }
    }

    /// Replace the selection, if any, with nothing.
    pub(crate) fn delete_selection(&mut self) {
        if let Some(range) = self.selection.take() {
            self.delete_range(range);
            self.caret = range.start_usize();
        }
    }

    /// Insert literal text at the caret with the current formatting.
    pub(crate) fn insert_at_caret(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let n = self.buffer.insert_literal(self.caret, text);
        let range = Range::from_usize(self.caret, self.caret + n);
        self.caret += n;
        self.apply_tags_on_insert(range);
    }

    pub(crate) fn insert_object_at_caret(&mut self, object: InlineObject) {
        self.buffer.insert_inline_object(self.caret, object);
        let range = Range::from_usize(self.caret, self.caret + 1);
        self.caret += 1;
        self.apply_tags_on_insert(range);
    }

    /// Insert literal text (no markup) at the caret, replacing the selection.
    pub fn insert_text(&mut self, text: &str) {
        self.delete_selection();
        self.insert_at_caret(text);
    }

    /// Insert `text` as a link to `url`, replacing the selection.
    pub fn insert_link(&mut self, url: &str, text: &str) -> LinkId {
        self.delete_selection();
        let id = self.toggle_link(Some(url)).unwrap_or_default();
        self.insert_at_caret(text);
        self.toggle_link(None);
        id
    }

    /// Insert the smiley written as `token` (markup, possibly escaped),
    /// replacing the selection.
    pub fn insert_smiley(&mut self, dialect: Option<&str>, token: &str) {
        self.delete_selection();
        self.insert_smiley_at_caret(dialect, token);
    }

    /// Insert a smiley object, or its text once the smiley caps are reached
    /// or when the token is not registered.
    pub(crate) fn insert_smiley_at_caret(&mut self, dialect: Option<&str>, raw: &str) {
        let unescaped = entity::unescape(raw);

        if self.smileys_this_insert >= MAX_SMILEYS_PER_INSERT
            || self.smileys_total >= MAX_SMILEYS_TOTAL
        {
            if self.smileys_this_insert == MAX_SMILEYS_PER_INSERT
                || self.smileys_total == MAX_SMILEYS_TOTAL
            {
                tracing::warn!(
                    per_insert = self.smileys_this_insert,
                    total = self.smileys_total,
                    "smiley limit reached, inserting text"
                );
            }
            self.insert_at_caret(&unescaped);
            return;
        }

        let handle = self.smileys.get(dialect, &unescaped);
        match handle {
            Some(handle) if self.format_functions.contains(Formats::SMILEY) => {
                let object = InlineObject::smiley(dialect, handle, &unescaped);
                self.insert_object_at_caret(object);
                self.smileys_this_insert += 1;
                self.smileys_total += 1;
            }
            _ => self.insert_at_caret(&unescaped),
        }
    }

    /// Insert an image placeholder for store id `id`, replacing the selection.
    ///
    /// Does nothing without an image provider.
    pub fn insert_image(&mut self, id: u32) -> bool {
        self.delete_selection();
        self.insert_image_at_caret(id)
    }

    pub(crate) fn insert_image_at_caret(&mut self, id: u32) -> bool {
        let Some(provider) = self.images.as_deref() else {
            return false;
        };
        let resolved = image::resolve(provider, id);
        self.insert_object_at_caret(InlineObject::image(
            id,
            resolved.filename,
            resolved.referenced,
        ));
        true
    }

    /// Insert markup at the end of the buffer.
    pub fn append_html(&mut self, markup: &str, options: crate::Options) {
        self.caret = self.buffer.len();
        self.selection = None;
        self.insert_html(markup, options);
    }

    // Deletion

    fn delete_range(&mut self, range: Range) {
        let removed = self.buffer.delete(range);
        if let Some(provider) = self.images.as_deref() {
            for id in removed.iter().filter_map(InlineObject::referenced_image) {
                provider.unref_image(id);
            }
        }
        self.smileys_total = 0;
    }

    /// Delete `start..end`, releasing image references it held.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        check_range(start, end, self.buffer.len())?;
        self.delete_range(Range::from_usize(start, end));
        if self.caret >= end {
            self.caret -= end - start;
        } else if self.caret > start {
            self.caret = start;
        }
        self.selection = None;
        Ok(())
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        let len = self.buffer.len();
        self.delete_range(Range::from_usize(0, len));
        self.caret = 0;
        self.selection = None;
    }

    // Output

    pub fn get_markup(&self) -> String {
        render::get_markup(&self.buffer)
    }

    pub fn get_markup_range(&self, start: usize, end: usize) -> Result<String> {
        render::serialize(&self.buffer, start, end)
    }

    pub fn get_markup_lines(&self) -> Vec<String> {
        render::get_markup_lines(&self.buffer)
    }

    pub fn get_text(&self, start: usize, end: usize) -> Result<String> {
        render::get_text(&self.buffer, start, end)
    }

    /// Plain text of the whole buffer.
    pub fn text(&self) -> String {
        render::plain_text(&self.buffer)
    }
}
