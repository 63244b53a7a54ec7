//! Inline CSS subset for `style="..."` attributes and colour normalization.
//!
//! Only the handful of properties a chat client emits are understood:
//! `color`, `background`, `font-family`, `font-size`, `font-weight` and
//! `text-decoration`. Everything else in a declaration list is ignored.

/// Value of `name` in a declaration list, trimmed.
///
/// Declarations are split on `;`; property names compare ignoring ASCII
/// case. The last declaration wins, as in a browser.
///
/// # Example
/// ```
/// use imhtml::css::property;
///
/// let style = "font-weight: bold; COLOR : #f00 ;";
/// assert_eq!(property(style, "color"), Some("#f00"));
/// assert_eq!(property(style, "font-size"), None);
/// ```
pub fn property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .last()
}

/// HTML colour keywords understood by chat clients.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("silver", "#c0c0c0"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("white", "#ffffff"),
    ("maroon", "#800000"),
    ("red", "#ff0000"),
    ("purple", "#800080"),
    ("fuchsia", "#ff00ff"),
    ("green", "#008000"),
    ("lime", "#00ff00"),
    ("olive", "#808000"),
    ("yellow", "#ffff00"),
    ("navy", "#000080"),
    ("blue", "#0000ff"),
    ("teal", "#008080"),
    ("aqua", "#00ffff"),
    ("orange", "#ffa500"),
];

/// Normalize a colour to lowercase `#rrggbb`.
///
/// Accepts `#rgb`, `#rrggbb`, bare `rrggbb`, colour keywords and
/// `rgb(r, g, b)` with integer or percentage components. Anything else is
/// returned unchanged so that hosts with richer colour tables still see
/// the original value.
///
/// # Example
/// ```
/// use imhtml::css::normalize_color;
///
/// assert_eq!(normalize_color("Red"), "#ff0000");
/// assert_eq!(normalize_color("#AbC"), "#aabbcc");
/// assert_eq!(normalize_color("rgb(100%, 0, 50%)"), "#ff0080");
/// assert_eq!(normalize_color("chartreuse"), "chartreuse");
/// ```
pub fn normalize_color(value: &str) -> String {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        if let Some(color) = expand_hex(hex) {
            return color;
        }
    } else if value.len() == 6 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return format!("#{}", value.to_ascii_lowercase());
    }

    if let Some(&(_, hex)) = NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
    {
        return hex.to_string();
    }

    if value.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("rgb(")) {
        match parse_rgb(value) {
            Some(color) => return color,
            None => tracing::warn!(value, "ignoring malformed rgb() colour"),
        }
    }

    value.to_string()
}

fn expand_hex(hex: &str) -> Option<String> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in hex.chars() {
                let c = c.to_ascii_lowercase();
                out.push(c);
                out.push(c);
            }
            Some(out)
        }
        6 => Some(format!("#{}", hex.to_ascii_lowercase())),
        _ => None,
    }
}

/// `rgb(r, g, b)` with each component an integer 0..=255 or a percentage.
fn parse_rgb(value: &str) -> Option<String> {
    let inner = value.get(4..)?.trim().strip_suffix(')')?;
    let mut channels = [0u8; 3];
    let mut parts = inner.split(',');
    for channel in &mut channels {
        *channel = parse_channel(parts.next()?.trim())?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        channels[0], channels[1], channels[2]
    ))
}

fn parse_channel(text: &str) -> Option<u8> {
    if let Some(pct) = text.strip_suffix('%') {
        let pct: f32 = pct.trim().parse().ok()?;
        if !(0.0..=100.0).contains(&pct) {
            return None;
        }
        return Some((pct * 255.0 / 100.0).round() as u8);
    }
    let n: u16 = text.parse().ok()?;
    u8::try_from(n).ok()
}

/// Map a CSS `font-size` value onto the 1..=7 HTML size scale.
///
/// Keywords map directly; lengths are converted to points and bucketed.
///
/// # Example
/// ```
/// use imhtml::css::font_size;
///
/// assert_eq!(font_size("xx-small"), 1);
/// assert_eq!(font_size("larger"), 4);
/// assert_eq!(font_size("16px"), 3);
/// assert_eq!(font_size("200%"), 6);
/// assert_eq!(font_size("inherit"), 3);
/// ```
pub fn font_size(value: &str) -> u8 {
    let value = value.trim();
    let keyword = |k: &str| value.eq_ignore_ascii_case(k);

    if keyword("xx-small") {
        1
    } else if keyword("x-small") || keyword("smaller") {
        2
    } else if keyword("medium") || keyword("larger") {
        4
    } else if keyword("large") {
        5
    } else if keyword("x-large") {
        6
    } else if keyword("xx-large") {
        7
    } else {
        length_points(value).map_or(3, points_to_size)
    }
}

/// Convert a CSS length to points.
fn length_points(value: &str) -> Option<f32> {
    let lower = value.to_ascii_lowercase();
    let (number, scale) = if let Some(n) = lower.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = lower.strip_suffix("px") {
        (n, 0.75)
    } else if let Some(n) = lower.strip_suffix("em") {
        (n, 12.0)
    } else if let Some(n) = lower.strip_suffix('%') {
        (n, 0.12)
    } else {
        (lower.as_str(), 1.0)
    };
    let n: f32 = number.trim().parse().ok()?;
    (n.is_finite() && n > 0.0).then_some(n * scale)
}

fn points_to_size(pt: f32) -> u8 {
    match pt {
        p if p <= 8.0 => 1,
        p if p <= 10.0 => 2,
        p if p <= 12.0 => 3,
        p if p <= 14.0 => 4,
        p if p <= 18.0 => 5,
        p if p <= 24.0 => 6,
        _ => 7,
    }
}

/// A `font-weight` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
    Bolder,
    Lighter,
}

impl FontWeight {
    /// Parse a weight keyword or number. Numbers of 700 and above are bold.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("bold") {
            FontWeight::Bold
        } else if value.eq_ignore_ascii_case("bolder") {
            FontWeight::Bolder
        } else if value.eq_ignore_ascii_case("lighter") {
            FontWeight::Lighter
        } else if value.eq_ignore_ascii_case("normal") {
            FontWeight::Normal
        } else {
            let digits = value.bytes().take_while(u8::is_ascii_digit).count();
            match value[..digits].parse::<u32>() {
                Ok(n) if n >= 700 => FontWeight::Bold,
                _ => FontWeight::Normal,
            }
        }
    }

    /// Bold level inside an element whose parent has `parent` levels.
    pub fn apply(self, parent: u8) -> u8 {
        match self {
            FontWeight::Normal => 0,
            FontWeight::Bold => 1,
            FontWeight::Bolder => parent.saturating_add(1),
            FontWeight::Lighter => parent.saturating_sub(1),
        }
    }
}

/// A `text-decoration` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

impl TextDecoration {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("underline") {
            Some(TextDecoration::Underline)
        } else if value.eq_ignore_ascii_case("line-through") {
            Some(TextDecoration::LineThrough)
        } else {
            None
        }
    }
}
