//! Just enough CSS for the markup this crate produces: element-selector rules
//! and inline `style` attributes with a handful of properties.

use std::collections::HashMap;

use crate::fonts::{Family, FontFace, family_for};
use crate::model::Alignment;

#[derive(Clone, Debug, PartialEq)]
pub(super) struct TextStyle {
    pub(super) family: Family,
    pub(super) bold: bool,
    pub(super) italic: bool,
    pub(super) underline: bool,
    pub(super) size: f32,
    pub(super) color: Option<[u8; 3]>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: Family::Times,
            bold: false,
            italic: false,
            underline: false,
            size: 12.0,
            color: None,
        }
    }
}

impl TextStyle {
    pub(super) fn face(&self) -> FontFace {
        FontFace::new(self.family, self.bold, self.italic)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct BoxStyle {
    pub(super) alignment: Alignment,
    pub(super) margin_top: f32,
    pub(super) margin_bottom: f32,
    pub(super) padding: f32,
    pub(super) border_width: f32,
    pub(super) border_color: Option<[u8; 3]>,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            margin_top: 0.0,
            margin_bottom: 0.0,
            padding: 0.0,
            border_width: 0.0,
            border_color: None,
        }
    }
}

pub(super) type Declarations = Vec<(String, String)>;

/// Rules keyed by lowercase element name. Later rules override earlier ones.
#[derive(Debug, Default)]
pub(super) struct Stylesheet {
    rules: HashMap<String, Declarations>,
}

impl Stylesheet {
    pub(super) fn parse(css: &str) -> Self {
        let mut rules: HashMap<String, Declarations> = HashMap::new();
        let mut rest = strip_comments(css);
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            let decls = parse_declarations(&rest[open + 1..close]);
            for selector in rest[..open].split(',') {
                let selector = selector.trim().to_ascii_lowercase();
                if selector.is_empty() || !selector.chars().all(|c| c.is_ascii_alphanumeric()) {
                    log::debug!("Ignoring unsupported CSS selector {selector:?}");
                    continue;
                }
                rules
                    .entry(selector)
                    .or_default()
                    .extend(decls.iter().cloned());
            }
            rest = rest[close + 1..].to_string();
        }
        Self { rules }
    }

    pub(super) fn rule(&self, element: &str) -> &[(String, String)] {
        self.rules.get(element).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// `a: b; c: d` → [("a", "b"), ("c", "d")], names lowercased.
pub(super) fn parse_declarations(block: &str) -> Declarations {
    block
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            (!name.is_empty() && !value.is_empty()).then(|| (name, value.to_string()))
        })
        .collect()
}

/// Apply the inherited text properties among `decls`; `em` resolves against the current size.
pub(super) fn apply_text(style: &mut TextStyle, decls: &[(String, String)]) {
    for (name, value) in decls {
        let value = value.as_str();
        match name.as_str() {
            "font-weight" => {
                style.bold = match value {
                    "bold" | "bolder" => true,
                    "normal" | "lighter" => false,
                    v => v.parse::<u16>().map(|w| w >= 600).unwrap_or(style.bold),
                }
            }
            "font-style" => style.italic = matches!(value, "italic" | "oblique"),
            "text-decoration" | "text-decoration-line" => {
                style.underline = value.split_whitespace().any(|v| v == "underline")
            }
            "font-size" => {
                if let Some(size) = parse_length(value, style.size).filter(|s| *s > 0.0) {
                    style.size = size;
                }
            }
            "font-family" => style.family = family_for(value),
            "color" => style.color = parse_color(value).filter(|c| *c != [0, 0, 0]),
            _ => {}
        }
    }
}

pub(super) fn apply_box(style: &mut BoxStyle, decls: &[(String, String)], font_size: f32) {
    for (name, value) in decls {
        let value = value.as_str();
        match name.as_str() {
            "text-align" => {
                style.alignment = match value {
                    "center" => Alignment::Center,
                    "right" | "end" => Alignment::Right,
                    "justify" => Alignment::Justify,
                    _ => Alignment::Left,
                }
            }
            "margin-top" => {
                if let Some(v) = parse_length(value, font_size) {
                    style.margin_top = v.max(0.0);
                }
            }
            "margin-bottom" => {
                if let Some(v) = parse_length(value, font_size) {
                    style.margin_bottom = v.max(0.0);
                }
            }
            "padding" => {
                if let Some(v) = value
                    .split_whitespace()
                    .next()
                    .and_then(|v| parse_length(v, font_size))
                {
                    style.padding = v.max(0.0);
                }
            }
            "border" => {
                style.border_width = 0.0;
                for part in value.split_whitespace() {
                    if part == "none" {
                        style.border_width = 0.0;
                        break;
                    }
                    if let Some(width) = parse_length(part, font_size) {
                        style.border_width = width.max(0.0);
                    } else if let Some(color) = parse_color(part) {
                        style.border_color = Some(color);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Length in points. Accepts `pt`, `px` (at 96 DPI), `em`, and bare `0`.
pub(super) fn parse_length(value: &str, font_size: f32) -> Option<f32> {
    let value = value.trim();
    let (num, factor) = if let Some(n) = value.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, 0.75)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, font_size)
    } else if value == "0" {
        ("0", 1.0)
    } else {
        return None;
    };
    num.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * factor)
}

/// `#rgb`, `#rrggbb`, or one of a few keywords.
pub(super) fn parse_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        return Some([r, g, b]);
    }
    match value.to_ascii_lowercase().as_str() {
        "black" => Some([0, 0, 0]),
        "white" => Some([255, 255, 255]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "gray" | "grey" => Some([128, 128, 128]),
        _ => None,
    }
}
