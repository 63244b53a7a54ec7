//! Styled-text model: characters, inline objects and style runs.
//!
//! The formatter and editor only talk to the model through
//! [`StyledTextSink`]; [`TextBuffer`] is the in-memory implementation used
//! by default.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::escape;
use crate::range::Range;
use crate::smiley::SmileyHandle;
use crate::style::{Style, StyleKind, StyleRun};

/// What an inline object stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// Image from the host's image store. `referenced` is set when the
    /// store's reference count was taken for this placeholder.
    Image {
        id: u32,
        filename: Option<String>,
        referenced: bool,
    },
    Smiley {
        dialect: Option<String>,
        handle: SmileyHandle,
    },
    /// Horizontal rule.
    Rule,
    Comment,
}

/// A non-text element occupying one buffer position.
///
/// Carries the text used in its place by plain-text extraction and by the
/// markup serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineObject {
    pub kind: ObjectKind,
    pub plain: String,
    pub markup: String,
}

impl InlineObject {
    pub fn image(id: u32, filename: Option<String>, referenced: bool) -> Self {
        Self {
            kind: ObjectKind::Image {
                id,
                filename,
                referenced,
            },
            plain: "[Image]".to_string(),
            markup: format!("<IMG ID=\"{id}\">"),
        }
    }

    /// `token` is the smiley text with entities already decoded; the markup
    /// form escapes it again.
    pub fn smiley(dialect: Option<&str>, handle: SmileyHandle, token: &str) -> Self {
        Self {
            kind: ObjectKind::Smiley {
                dialect: dialect.map(str::to_string),
                handle,
            },
            plain: token.to_string(),
            markup: escape::escape_text(token),
        }
    }

    pub fn rule() -> Self {
        Self {
            kind: ObjectKind::Rule,
            plain: "\n---\n".to_string(),
            markup: "<hr>".to_string(),
        }
    }

    pub fn comment(text: &str) -> Self {
        Self {
            kind: ObjectKind::Comment,
            plain: text.to_string(),
            markup: format!("<!--{text}-->"),
        }
    }

    /// Image id whose store reference this object holds.
    pub fn referenced_image(&self) -> Option<u32> {
        match self.kind {
            ObjectKind::Image {
                id,
                referenced: true,
                ..
            } => Some(id),
            _ => None,
        }
    }
}

/// One buffer position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Char(char),
    Object(Box<InlineObject>),
}

/// The operations the formatter needs from a styled-text model.
///
/// Positions count characters and inline objects. Ranges are half-open.
pub trait StyledTextSink {
    /// Number of positions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert literal text at `pos`, returning the number of positions added.
    ///
    /// Runs that begin at or after `pos` move right; runs that strictly
    /// contain `pos` grow to cover the new text.
    fn insert_literal(&mut self, pos: usize, text: &str) -> usize;

    /// Insert an inline object at `pos`. Runs shift as for literal text.
    fn insert_inline_object(&mut self, pos: usize, object: InlineObject);

    /// Apply `style` over `range`, merging with touching runs of the same style.
    fn apply_style(&mut self, style: Style, range: Range);

    /// Remove runs of `kind` from `range`.
    ///
    /// With `homogeneous`, only the styles of `kind` active at
    /// `range.start` are removed. Otherwise every run of `kind` overlapping
    /// the range is cut back, splitting runs that extend past either end.
    fn remove_style(&mut self, kind: StyleKind, range: Range, homogeneous: bool);

    /// Delete `range`, returning the inline objects it contained.
    fn delete(&mut self, range: Range) -> Vec<InlineObject>;

    fn slot(&self, pos: usize) -> Option<&Slot>;

    /// All runs ordered by start, then longest first, then kind.
    fn runs(&self) -> &[StyleRun];

    /// Runs containing `pos`.
    fn styles_at(&self, pos: usize) -> Vec<&StyleRun> {
        self.runs()
            .iter()
            .filter(|run| run.start() <= pos && pos < run.end())
            .collect()
    }

    /// Runs whose last position is `pos - 1`.
    fn styles_ending_at(&self, pos: usize) -> Vec<&StyleRun> {
        self.runs().iter().filter(|run| run.end() == pos).collect()
    }
}

/// In-memory styled text.
///
/// Runs stay sorted by [`run_order`] between edits, so applying or removing
/// a style only touches the runs near the affected range.
///
/// # Example
/// ```
/// use imhtml::buffer::{StyledTextSink, TextBuffer};
/// use imhtml::style::Style;
/// use imhtml::Range;
///
/// let mut buf = TextBuffer::new();
/// buf.insert_literal(0, "hello world");
/// buf.apply_style(Style::Bold, Range::new(0, 5));
/// buf.apply_style(Style::Bold, Range::new(5, 8));
///
/// assert_eq!(buf.runs().len(), 1);
/// assert_eq!(buf.runs()[0].range, Range::new(0, 8));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    slots: Vec<Slot>,
    runs: Vec<StyleRun>,
    /// Upper bound on the length of any run.
    longest: u32,
}

/// Order of [`StyledTextSink::runs`]: start, then longest first, then kind.
fn run_order(a: &StyleRun, b: &StyleRun) -> Ordering {
    a.range
        .start
        .cmp(&b.range.start)
        .then(b.range.end.cmp(&a.range.end))
        .then(a.kind().cmp(&b.kind()))
        .then(a.style.cmp(&b.style))
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Remove everything.
    pub fn clear(&mut self) -> Vec<InlineObject> {
        let len = self.slots.len();
        self.delete(Range::from_usize(0, len))
    }

    /// Index span of the runs that may reach `from` and start at or before `to`.
    fn window(&self, from: u32, to: u32) -> std::ops::Range<usize> {
        let floor = from.saturating_sub(self.longest);
        let lo = self.runs.partition_point(|run| run.range.start < floor);
        let hi = self.runs.partition_point(|run| run.range.start <= to);
        lo..hi.max(lo)
    }

    fn insert_sorted(&mut self, run: StyleRun) {
        self.longest = self.longest.max(run.range.len());
        let at = self
            .runs
            .partition_point(|other| run_order(other, &run) == Ordering::Less);
        self.runs.insert(at, run);
    }

    fn shift_for_insert(&mut self, pos: usize, n: usize) {
        let pos = pos as u32;
        let n = n as u32;
        let split = self.runs.partition_point(|run| run.range.start < pos);
        for run in &mut self.runs[split..] {
            run.range.start += n;
            run.range.end += n;
        }

        let window = self.window(pos, pos);
        let mut grown = false;
        for run in &mut self.runs[window] {
            if run.range.end > pos {
                run.range.end += n;
                grown = true;
            }
        }
        if grown {
            self.longest += n;
        }
    }

    /// Rebuild run order from scratch, merging touching runs of the same style.
    fn normalize(&mut self) {
        self.runs.retain(|run| !run.range.is_empty());
        self.runs
            .sort_by(|a, b| a.style.cmp(&b.style).then(a.range.start.cmp(&b.range.start)));

        let mut merged: Vec<StyleRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.style == run.style && last.range.touches(&run.range) => {
                    last.range = last.range.union(&run.range);
                }
                _ => merged.push(run),
            }
        }

        merged.sort_by(run_order);
        self.longest = merged.iter().map(|run| run.range.len()).max().unwrap_or(0);
        self.runs = merged;
    }
}

impl StyledTextSink for TextBuffer {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn insert_literal(&mut self, pos: usize, text: &str) -> usize {
        let pos = pos.min(self.slots.len());
        let before = self.slots.len();
        self.slots
            .splice(pos..pos, text.chars().map(Slot::Char));
        let n = self.slots.len() - before;
        if n > 0 {
            self.shift_for_insert(pos, n);
        }
        n
    }

    fn insert_inline_object(&mut self, pos: usize, object: InlineObject) {
        let pos = pos.min(self.slots.len());
        self.slots.insert(pos, Slot::Object(Box::new(object)));
        self.shift_for_insert(pos, 1);
    }

    fn apply_style(&mut self, style: Style, range: Range) {
        let end = range.end.min(self.slots.len() as u32);
        if range.start >= end {
            return;
        }

        // Same-style runs never touch each other, so only runs touching the
        // new range can be absorbed.
        let mut merged = Range::new(range.start, end);
        let window = self.window(range.start, end);
        let (mut i, mut hi) = (window.start, window.end);
        while i < hi {
            let run = &self.runs[i];
            if run.style == style && run.range.touches(&merged) {
                merged = merged.union(&run.range);
                self.runs.remove(i);
                hi -= 1;
            } else {
                i += 1;
            }
        }
        self.insert_sorted(StyleRun::new(style, merged));
    }

    fn remove_style(&mut self, kind: StyleKind, range: Range, homogeneous: bool) {
        if range.is_empty() {
            return;
        }

        let window = self.window(range.start, range.end.saturating_sub(1));
        let mut targets: SmallVec<[Style; 2]> = SmallVec::new();
        for run in &self.runs[window.clone()] {
            let hit = if homogeneous {
                run.range.contains(range.start)
            } else {
                run.range.overlaps(&range)
            };
            if hit && run.kind() == kind && !targets.contains(&run.style) {
                targets.push(run.style.clone());
            }
        }
        if targets.is_empty() {
            return;
        }

        let mut pieces = Vec::new();
        let (mut i, mut hi) = (window.start, window.end);
        while i < hi {
            let run = &self.runs[i];
            if !run.range.overlaps(&range) || !targets.contains(&run.style) {
                i += 1;
                continue;
            }
            let run = self.runs.remove(i);
            hi -= 1;
            if run.range.start < range.start {
                pieces.push(StyleRun::new(
                    run.style.clone(),
                    Range::new(run.range.start, range.start),
                ));
            }
            if range.end < run.range.end {
                pieces.push(StyleRun::new(run.style, Range::new(range.end, run.range.end)));
            }
        }
        for piece in pieces {
            self.insert_sorted(piece);
        }
    }

    fn delete(&mut self, range: Range) -> Vec<InlineObject> {
        let len = self.slots.len();
        let start = range.start_usize().min(len);
        let end = range.end_usize().min(len);
        if start >= end {
            return Vec::new();
        }

        let removed: Vec<InlineObject> = self
            .slots
            .drain(start..end)
            .filter_map(|slot| match slot {
                Slot::Object(obj) => Some(*obj),
                Slot::Char(_) => None,
            })
            .collect();

        let (s, e) = (start as u32, end as u32);
        let map = |x: u32| {
            if x <= s {
                x
            } else if x >= e {
                x - (e - s)
            } else {
                s
            }
        };
        for run in &mut self.runs {
            run.range = Range::new(map(run.range.start), map(run.range.end));
        }
        self.normalize();

        removed
    }

    fn slot(&self, pos: usize) -> Option<&Slot> {
        self.slots.get(pos)
    }

    fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    fn styles_at(&self, pos: usize) -> Vec<&StyleRun> {
        let at = pos as u32;
        self.runs[self.window(at, at)]
            .iter()
            .filter(|run| run.range.contains(at))
            .collect()
    }

    fn styles_ending_at(&self, pos: usize) -> Vec<&StyleRun> {
        let at = pos as u32;
        self.runs[self.window(at, at)]
            .iter()
            .filter(|run| run.range.end == at)
            .collect()
    }
}
