//! Property tests: arbitrary markup never panics, serialized output
//! reparses to the same buffer, and runs stay well-formed.

use imhtml::{Editor, Options, Range, Style, StyledTextSink};
use proptest::prelude::*;

/// Markup-ish fragments, so generated input hits real tags often.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<i>".to_string()),
        Just("</i>".to_string()),
        Just("<u>".to_string()),
        Just("</u>".to_string()),
        Just("<s>".to_string()),
        Just("</s>".to_string()),
        Just("<sub>".to_string()),
        Just("</sub>".to_string()),
        Just("<font color=\"red\">".to_string()),
        Just("<font face=\"Arial\" size=\"+1\">".to_string()),
        Just("<font back=\"#123\">".to_string()),
        Just("</font>".to_string()),
        Just("<span style=\"font-weight: bold; color: blue\">".to_string()),
        Just("</span>".to_string()),
        Just("<a href=\"http://x\">".to_string()),
        Just("</a>".to_string()),
        Just("<img src=\"http://x\" alt=\"p\">".to_string()),
        Just(" http://x ".to_string()),
        Just("<br>".to_string()),
        Just("<hr>".to_string()),
        Just("<!--c-->".to_string()),
        Just("&amp;".to_string()),
        Just("&lt;".to_string()),
        Just("&#66;".to_string()),
        Just("<weird>".to_string()),
        Just("\n".to_string()),
        "[a-z ]{1,6}",
    ]
}

fn markup() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..24).prop_map(|v| v.concat())
}

fn parse(input: &str) -> Editor {
    let mut ed = Editor::new();
    ed.insert_html(input, Options::default());
    ed
}

fn runs(ed: &Editor) -> Vec<(Style, Range)> {
    ed.buffer()
        .runs()
        .iter()
        .map(|r| (r.style.clone(), r.range))
        .collect()
}

/// Link ids differ between sessions; compare by URL only.
fn comparable(ed: &Editor) -> Vec<(Style, Range)> {
    runs(ed)
        .into_iter()
        .map(|(style, range)| match style {
            Style::Link { url, .. } => (Style::Link { id: 0, url }, range),
            other => (other, range),
        })
        .collect()
}

proptest! {
    #[test]
    fn never_panics_on_arbitrary_input(input in "\\PC{0,200}") {
        let ed = parse(&input);
        let _ = ed.get_markup();
        let _ = ed.get_markup_lines();
        let _ = ed.text();
    }

    #[test]
    fn round_trip_is_stable(input in markup()) {
        let first = parse(&input);
        let markup = first.get_markup();
        let second = parse(&markup);
        prop_assert_eq!(first.text(), second.text());
        prop_assert_eq!(comparable(&first), comparable(&second));
        prop_assert_eq!(markup, second.get_markup());
    }

    #[test]
    fn runs_are_well_formed(input in markup()) {
        let ed = parse(&input);
        let len = ed.len() as u32;
        let all = ed.buffer().runs();
        for run in all {
            prop_assert!(run.range.start < run.range.end);
            prop_assert!(run.range.end <= len);
        }
        // Same style never touches or overlaps itself.
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                if a.style == b.style {
                    prop_assert!(!a.range.touches(&b.range), "{:?} and {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn serialized_ranges_are_balanced(input in markup(), cut in 0usize..64) {
        let ed = parse(&input);
        let end = ed.len();
        let start = cut.min(end);
        let out = ed.get_markup_range(start, end).unwrap();
        let opens = out.matches("<b>").count();
        let closes = out.matches("</b>").count();
        prop_assert_eq!(opens, closes);
    }
}
