use imhtml::{to_markup, to_markup_with_options, to_text, Editor, Options, Range, Style, StyledTextSink};

fn parse(input: &str) -> Editor {
    let mut editor = Editor::new();
    editor.insert_html(input, Options::default());
    editor
}

fn runs(editor: &Editor) -> Vec<(Style, Range)> {
    editor
        .buffer()
        .runs()
        .iter()
        .map(|r| (r.style.clone(), r.range))
        .collect()
}

fn red() -> Style {
    Style::ForeColor("#ff0000".into())
}

fn blue() -> Style {
    Style::ForeColor("#0000ff".into())
}

#[test]
fn bold_with_nested_italic() {
    let ed = parse("<b>hi <i>there</i></b>");
    assert_eq!(ed.text(), "hi there");
    assert_eq!(
        runs(&ed),
        vec![(Style::Bold, Range::new(0, 8)), (Style::Italic, Range::new(3, 8))]
    );
}

#[test]
fn round_trip_reproduces_runs() {
    let input = "<b>hi <i>there</i></b>";
    let first = parse(input);
    let second = parse(&first.get_markup());
    assert_eq!(runs(&first), runs(&second));
    assert_eq!(first.text(), second.text());
}

#[test]
fn nested_bold_is_one_run() {
    let ed = parse("<b>a<b>b</b>c</b>");
    assert_eq!(runs(&ed), vec![(Style::Bold, Range::new(0, 3))]);
}

#[test]
fn unbalanced_open_is_closed_at_end() {
    let ed = parse("<b><b>x</b>");
    assert_eq!(runs(&ed), vec![(Style::Bold, Range::new(0, 1))]);
    assert_eq!(ed.get_markup(), "<b>x</b>");
}

#[test]
fn extra_close_is_ignored() {
    assert_eq!(to_markup("a</b></i></font></span></a>b"), "ab");
}

#[test]
fn value_restoration_keeps_gapped_runs_apart() {
    let ed = parse("<font color=red>a<font color=blue>b</font>c</font>");
    assert_eq!(
        runs(&ed),
        vec![
            (red(), Range::new(0, 1)),
            (blue(), Range::new(1, 2)),
            (red(), Range::new(2, 3)),
        ]
    );
}

#[test]
fn inner_font_inherits_outer_face() {
    let ed = parse("<font face=\"Arial\"><font color=\"red\">a</font>b</font>");
    assert_eq!(
        runs(&ed),
        vec![
            (Style::FontFace("Arial".into()), Range::new(0, 2)),
            (red(), Range::new(0, 1)),
        ]
    );
}

#[test]
fn font_sizes() {
    assert_eq!(to_markup("<font size=\"+2\">x</font>"), "<font size=\"5\">x</font>");
    assert_eq!(to_markup("<font size=\"-1\">x</font>"), "<font size=\"2\">x</font>");
    assert_eq!(to_markup("<font size=\"12\">x</font>"), "<font size=\"7\">x</font>");
}

#[test]
fn unknown_tag_passthrough() {
    let ed = parse("<weird>hi</weird>");
    assert_eq!(ed.text(), "<weird>hi</weird>");
    assert_eq!(ed.get_markup(), "&lt;weird&gt;hi&lt;/weird&gt;");
    assert!(runs(&ed).is_empty());
}

#[test]
fn unterminated_tag_is_text() {
    assert_eq!(to_text("a <b no end"), "a <b no end");
}

#[test]
fn entities_and_numeric_references() {
    assert_eq!(to_text("&amp;foo &#65;&#66; &copy; &reg; &apos;"), "&foo AB \u{a9} \u{ae} '");
    assert_eq!(to_text("&#;&#x41;&amp"), "&#;&#x41;&amp");
}

#[test]
fn serializer_escapes_text() {
    assert_eq!(to_markup("&lt;tag&gt; &amp; &quot;q&quot;"), "&lt;tag&gt; &amp; &quot;q&quot;");
}

#[test]
fn br_variants() {
    assert_eq!(to_text("a<br>b<BR/>c<br clear=\"all\">d"), "a\nb\nc\nd");
    assert_eq!(to_markup("a<br>b"), "a<br>b");
}

#[test]
fn no_newline_option() {
    let opts = Options {
        no_newline: true,
        ..Options::default()
    };
    assert_eq!(to_markup_with_options("a\nb", opts), "a b");
    assert_eq!(to_markup_with_options("a<br>\nb", opts), "a<br>b");
}

#[test]
fn links() {
    let ed = parse("<a href=\"http://example.org/?a=1&amp;b=2\">site</a> after");
    assert_eq!(
        ed.get_markup(),
        "<a href=\"http://example.org/?a=1&amp;b=2\">site</a> after"
    );
    let link = ed.buffer().runs()[0].clone();
    assert_eq!(link.range, Range::new(0, 4));
    match link.style {
        Style::Link { id, url } => {
            assert_eq!(url, "http://example.org/?a=1&b=2");
            assert_eq!(ed.link_url(id), Some(url.as_str()));
        }
        other => panic!("expected link, got {other:?}"),
    }
}

#[test]
fn nested_anchor_replaces_link() {
    assert_eq!(
        to_markup("<a href=\"x\">1<a href=\"y\">2</a>3"),
        "<a href=\"x\">1</a><a href=\"y\">2</a>3"
    );
}

#[test]
fn auto_linking() {
    assert_eq!(
        to_markup("go to https://rust-lang.org now"),
        "go to <a href=\"https://rust-lang.org\">https://rust-lang.org</a> now"
    );
    assert_eq!(
        to_markup("MAILTO:me@example.org"),
        "<a href=\"MAILTO:me@example.org\">MAILTO:me@example.org</a>"
    );
    assert_eq!(to_markup("word:http://x"), "word:http://x");
    assert_eq!(to_markup("http://"), "http://");
}

#[test]
fn auto_link_registered_protocol() {
    let mut ed = Editor::new();
    ed.protocols_mut().register("spotify:");
    ed.insert_html("spotify:track:1", Options::default());
    assert_eq!(
        ed.get_markup(),
        "<a href=\"spotify:track:1\">spotify:track:1</a>"
    );
}

#[test]
fn css_spans() {
    assert_eq!(
        to_markup("<span style=\"color: #00F; font-family: 'Comic Sans MS'\">x</span>"),
        "<font face=\"Comic Sans MS\"><font color=\"#0000ff\">x</font></font>"
    );
    assert_eq!(
        to_markup("<span style=\"font-size: x-large\">x</span>"),
        "<font size=\"6\">x</font>"
    );
    assert_eq!(
        to_markup("<span style=\"text-decoration: line-through\">x</span>"),
        "<s>x</s>"
    );
    assert_eq!(to_markup("<span style=\"margin: 0\">x</span>"), "x");
    assert_eq!(to_markup("<p style=\"font-weight: 700\">x</p>"), "<b>x</b>");
}

#[test]
fn css_bolder_and_lighter_are_relative() {
    assert_eq!(
        to_markup(
            "<span style=\"font-weight: bolder\">a<span style=\"font-weight: lighter\">b</span>c</span>"
        ),
        "<b>a</b>b<b>c</b>"
    );
}

#[test]
fn body_background() {
    assert_eq!(
        to_markup("<body bgcolor=\"#FFFFFF\">x</body>y"),
        "<body bgcolor=\"#ffffff\">x</body>y"
    );
}

#[test]
fn structural_tags_are_inert() {
    assert_eq!(
        to_markup("<html><head></head><p>a</p><h3>b</h3><cite>c</cite></html>"),
        "abc"
    );
}

#[test]
fn sub_sup_pre_title() {
    assert_eq!(to_markup("x<sub>2</sub>y<sup>3</sup>"), "x<sub>2</sub>y<sup>3</sup>");
    assert_eq!(to_markup("<pre>code</pre>"), "<pre>code</pre>");
    assert_eq!(to_markup("<title>t</title>body"), "<title>t</title>body");
}

#[test]
fn comments() {
    let ed = parse("a<!-- hidden -->b");
    assert_eq!(ed.len(), 3);
    assert_eq!(ed.get_markup(), "a<!-- hidden -->b");

    let opts = Options {
        no_comments: true,
        ..Options::default()
    };
    assert_eq!(to_markup_with_options("a<!-- hidden -->b", opts), "ab");
}

#[test]
fn horizontal_rule() {
    let ed = parse("above<hr>below");
    assert_eq!(ed.get_markup(), "above<hr>below");
    assert_eq!(ed.text(), "above\n---\nbelow");
}

#[test]
fn option_filters() {
    let input = "<font face=\"Arial\" size=\"5\" color=\"red\"><b>x</b></font>";
    let opts = |f: fn(&mut Options)| {
        let mut o = Options::default();
        f(&mut o);
        o
    };
    assert_eq!(
        to_markup_with_options(input, opts(|o| o.no_fonts = true)),
        "<font size=\"5\"><font color=\"#ff0000\"><b>x</b></font></font>"
    );
    assert_eq!(
        to_markup_with_options(input, opts(|o| o.no_sizes = true)),
        "<font face=\"Arial\"><font color=\"#ff0000\"><b>x</b></font></font>"
    );
    assert_eq!(
        to_markup_with_options(input, opts(|o| o.no_formatting = true)),
        "<font face=\"Arial\"><font size=\"5\"><font color=\"#ff0000\">x</font></font></font>"
    );
}

#[test]
fn overlapping_input_serializes_nested() {
    let ed = parse("<b>12<u>34</b>56</u>");
    assert_eq!(ed.get_markup(), "<b>12<u>34</u></b><u>56</u>");
    let reparsed = parse(&ed.get_markup());
    assert_eq!(runs(&ed), runs(&reparsed));
}

#[test]
fn markup_range_and_lines() {
    let ed = parse("<b>one\ntwo</b>\n\nthree");
    assert_eq!(ed.get_markup_range(4, 7).unwrap(), "<b>two</b>");
    assert_eq!(ed.get_markup_lines(), vec!["<b>one</b>", "<b>two</b>", "three"]);
    assert_eq!(ed.get_text(0, 3).unwrap(), "one");
    assert!(ed.get_markup_range(5, 4).is_err());
    assert!(ed.get_text(0, 100).is_err());
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 2000;
    let input = format!("{}x{}", "<b><font color=red>".repeat(depth), "</font></b>".repeat(depth));
    let ed = parse(&input);
    assert_eq!(ed.text(), "x");
    assert_eq!(ed.get_markup(), "<font color=\"#ff0000\"><b>x</b></font>");
}

#[test]
fn split_anchor_reparses_as_one_link() {
    let ed = parse("<b>a<a href=\"x\">b</b>c</a>");
    let markup = ed.get_markup();
    assert_eq!(markup, "<b>a<a href=\"x\">b</a></b><a href=\"x\">c</a>");

    let reparsed = parse(&markup);
    let links: Vec<_> = reparsed
        .buffer()
        .runs()
        .iter()
        .filter(|r| matches!(r.style, Style::Link { .. }))
        .map(|r| r.range)
        .collect();
    assert_eq!(links, vec![Range::new(1, 3)]);
    assert_eq!(reparsed.get_markup(), markup);
}

fn link_ranges(editor: &Editor) -> Vec<Range> {
    editor
        .buffer()
        .runs()
        .iter()
        .filter(|r| matches!(r.style, Style::Link { .. }))
        .map(|r| r.range)
        .collect()
}

#[test]
fn adjacent_image_links_join() {
    let ed = parse("<img src=\"http://i\" alt=\"p\"><img src=\"http://i\" alt=\"q\">");
    assert_eq!(link_ranges(&ed), vec![Range::new(0, 2)]);
    let markup = ed.get_markup();
    assert_eq!(markup, "<a href=\"http://i\">pq</a>");
    assert_eq!(parse(&markup).get_markup(), markup);
}

#[test]
fn auto_link_continues_anchor_with_same_url() {
    let ed = parse("<a href=\"http://x\">go</a>http://x");
    assert_eq!(link_ranges(&ed), vec![Range::new(0, 10)]);
    let markup = ed.get_markup();
    assert_eq!(markup, "<a href=\"http://x\">gohttp://x</a>");

    let reparsed = parse(&markup);
    assert_eq!(link_ranges(&reparsed), vec![Range::new(0, 10)]);
    assert_eq!(reparsed.get_markup(), markup);
}
