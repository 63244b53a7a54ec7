//! Markup and plain-text output from a styled-text buffer.
//!
//! Runs in the model may overlap arbitrarily, while markup must nest. The
//! serializer keeps a stack of open runs; when a run ends underneath others,
//! everything above it is closed and the survivors are reopened right after.

use smallvec::SmallVec;

use crate::buffer::{Slot, StyledTextSink};
use crate::error::{check_range, Result};
use crate::escape;
use crate::style::{Style, StyleRun};

/// Markup output buffer.
///
/// # Example
/// ```
/// use imhtml::render::MarkupWriter;
/// use imhtml::style::Style;
///
/// let mut writer = MarkupWriter::with_capacity_for(16);
/// writer.open(&Style::Bold);
/// writer.write_escaped_text("a < b");
/// writer.close(&Style::Bold);
///
/// assert_eq!(writer.into_string(), "<b>a &lt; b</b>");
/// ```
#[derive(Debug, Default)]
pub struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    #[inline]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(1024),
        }
    }

    /// Reserve for `len` positions of text plus some tag overhead.
    #[inline]
    pub fn with_capacity_for(len: usize) -> Self {
        Self {
            out: String::with_capacity(len + len / 2),
        }
    }

    /// Write markup verbatim.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_text_into(&mut self.out, text);
    }

    #[inline]
    pub fn open(&mut self, style: &Style) {
        style.write_open(&mut self.out);
    }

    #[inline]
    pub fn close(&mut self, style: &Style) {
        self.out.push_str(style.close_tag());
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Markup for positions `start..end`.
///
/// Runs that began before `start` are opened at the front of the output,
/// and everything still open at `end` is closed, so the result is always
/// balanced.
pub fn serialize<S: StyledTextSink + ?Sized>(buffer: &S, start: usize, end: usize) -> Result<String> {
    check_range(start, end, buffer.len())?;
    let mut writer = MarkupWriter::with_capacity_for(end - start);
    write_range(buffer, start, end, &mut writer);
    Ok(writer.into_string())
}

fn write_range<S: StyledTextSink + ?Sized>(
    buffer: &S,
    start: usize,
    end: usize,
    writer: &mut MarkupWriter,
) {
    if start == end {
        return;
    }

    let runs = buffer.runs();
    let mut open: SmallVec<[&StyleRun; 16]> = SmallVec::new();
    let mut reopen: SmallVec<[&StyleRun; 8]> = SmallVec::new();
    // Characters between tags, escaped in one pass when a tag or object is due.
    let mut text = String::new();

    // Runs are sorted by start; `next` is the first one not yet considered.
    let mut next = 0;
    while next < runs.len() && runs[next].start() <= start {
        let run = &runs[next];
        if run.end() > start {
            writer.open(&run.style);
            open.push(run);
        }
        next += 1;
    }

    for pos in start..end {
        while next < runs.len() && runs[next].start() <= pos {
            let run = &runs[next];
            next += 1;
            if run.end() <= pos {
                tracing::warn!(style = ?run.style, pos, "skipping a run that ends before it opens");
                continue;
            }
            flush_text(writer, &mut text);
            writer.open(&run.style);
            open.push(run);
        }

        match buffer.slot(pos) {
            Some(Slot::Char(ch)) => text.push(*ch),
            Some(Slot::Object(object)) => {
                flush_text(writer, &mut text);
                writer.write_str(&object.markup);
            }
            None => {}
        }

        let boundary = pos + 1;
        if boundary == end {
            break;
        }

        // Lowest stack entry that ends here; everything above it comes off.
        let Some(lowest) = open.iter().position(|run| run.end() == boundary) else {
            continue;
        };
        flush_text(writer, &mut text);
        reopen.clear();
        while open.len() > lowest {
            let Some(run) = open.pop() else { break };
            writer.close(&run.style);
            if run.end() != boundary {
                reopen.push(run);
            }
        }
        while let Some(run) = reopen.pop() {
            writer.open(&run.style);
            open.push(run);
        }
    }

    flush_text(writer, &mut text);
    while let Some(run) = open.pop() {
        writer.close(&run.style);
    }
}

#[inline]
fn flush_text(writer: &mut MarkupWriter, text: &mut String) {
    if !text.is_empty() {
        writer.write_escaped_text(text);
        text.clear();
    }
}

/// Markup for the whole buffer.
pub fn get_markup<S: StyledTextSink + ?Sized>(buffer: &S) -> String {
    let mut writer = MarkupWriter::with_capacity_for(buffer.len());
    write_range(buffer, 0, buffer.len(), &mut writer);
    writer.into_string()
}

/// Markup for each non-empty line, without the line breaks.
pub fn get_markup_lines<S: StyledTextSink + ?Sized>(buffer: &S) -> Vec<String> {
    let len = buffer.len();
    let mut lines = Vec::new();
    let mut line_start = 0;
    for pos in 0..=len {
        let at_break = pos == len || matches!(buffer.slot(pos), Some(Slot::Char('\n')));
        if !at_break {
            continue;
        }
        if pos > line_start {
            let mut writer = MarkupWriter::with_capacity_for(pos - line_start);
            write_range(buffer, line_start, pos, &mut writer);
            lines.push(writer.into_string());
        }
        line_start = pos + 1;
    }
    lines
}

/// Plain text for `start..end`; inline objects contribute their fallback text.
pub fn get_text<S: StyledTextSink + ?Sized>(buffer: &S, start: usize, end: usize) -> Result<String> {
    check_range(start, end, buffer.len())?;
    let mut out = String::with_capacity(end - start);
    write_text(buffer, start, end, &mut out);
    Ok(out)
}

/// Plain text of the whole buffer.
pub fn plain_text<S: StyledTextSink + ?Sized>(buffer: &S) -> String {
    let mut out = String::with_capacity(buffer.len());
    write_text(buffer, 0, buffer.len(), &mut out);
    out
}

fn write_text<S: StyledTextSink + ?Sized>(buffer: &S, start: usize, end: usize, out: &mut String) {
    for pos in start..end {
        match buffer.slot(pos) {
            Some(Slot::Char(ch)) => out.push(*ch),
            Some(Slot::Object(object)) => out.push_str(&object.plain),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{InlineObject, TextBuffer};
    use crate::error::Error;
    use crate::range::Range;

    fn buffer(text: &str, styles: &[(Style, u32, u32)]) -> TextBuffer {
        let mut buf = TextBuffer::new();
        buf.insert_literal(0, text);
        for (style, s, e) in styles {
            buf.apply_style(style.clone(), Range::new(*s, *e));
        }
        buf
    }

    #[test]
    fn test_nested_runs() {
        let buf = buffer("abc", &[(Style::Bold, 0, 3), (Style::Italic, 1, 2)]);
        assert_eq!(get_markup(&buf), "<b>a<i>b</i>c</b>");
    }

    #[test]
    fn test_interleaved_runs_reopen() {
        let buf = buffer("abcd", &[(Style::Bold, 0, 2), (Style::Italic, 1, 4)]);
        assert_eq!(get_markup(&buf), "<b>a<i>b</i></b><i>cd</i>");
    }

    #[test]
    fn test_partial_range_preopens() {
        let buf = buffer("abcdef", &[(Style::Bold, 0, 6), (Style::Underline, 2, 4)]);
        assert_eq!(serialize(&buf, 3, 5).unwrap(), "<b><u>d</u>e</b>");
        assert_eq!(serialize(&buf, 1, 1).unwrap(), "");
    }

    #[test]
    fn test_range_errors() {
        let buf = buffer("ab", &[]);
        assert_eq!(
            serialize(&buf, 2, 1),
            Err(Error::InvalidRange { start: 2, end: 1 })
        );
        assert_eq!(get_text(&buf, 0, 5), Err(Error::OutOfBounds { pos: 5, len: 2 }));
    }

    #[test]
    fn test_text_is_escaped() {
        let buf = buffer("<a & \"b\">", &[]);
        assert_eq!(get_markup(&buf), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_newline_becomes_br() {
        let buf = buffer("a\nb", &[]);
        assert_eq!(get_markup(&buf), "a<br>b");
    }

    #[test]
    fn test_objects_use_fallbacks() {
        let mut buf = buffer("ab", &[]);
        buf.insert_inline_object(1, InlineObject::rule());
        assert_eq!(get_markup(&buf), "a<hr>b");
        assert_eq!(plain_text(&buf), "a\n---\nb");
    }

    #[test]
    fn test_markup_lines_skip_empty() {
        let buf = buffer("one\n\ntwo\n", &[(Style::Bold, 1, 7)]);
        assert_eq!(get_markup_lines(&buf), vec!["o<b>ne</b>", "<b>tw</b>o"]);
    }

    #[test]
    fn test_same_span_opens_in_kind_order() {
        let buf = buffer(
            "x",
            &[
                (Style::Bold, 0, 1),
                (Style::ForeColor("#ff0000".into()), 0, 1),
                (Style::Link { id: 0, url: "u".into() }, 0, 1),
            ],
        );
        assert_eq!(
            get_markup(&buf),
            "<a href=\"u\"><font color=\"#ff0000\"><b>x</b></font></a>"
        );
    }

    #[test]
    fn test_writer() {
        let mut w = MarkupWriter::new();
        w.write_str("<b>");
        w.write_escaped_text("&");
        assert_eq!(w.as_str(), "<b>&amp;");
    }

    #[test]
    fn test_text_between_tags_escaped_in_batches() {
        let mut buf = buffer("a<b&c\nd>e", &[(Style::Italic, 2, 5)]);
        buf.insert_inline_object(4, InlineObject::rule());
        assert_eq!(get_markup(&buf), "a&lt;<i>b&amp;<hr>c</i><br>d&gt;e");
    }

    #[test]
    fn test_many_sibling_runs() {
        let text = "ab".repeat(500);
        let styles: Vec<_> = (0..500u32).map(|i| (Style::Bold, i * 2, i * 2 + 1)).collect();
        let buf = buffer(&text, &styles);
        assert_eq!(buf.runs().len(), 500);
        assert_eq!(get_markup(&buf), "<b>a</b>b".repeat(500));
    }
}
