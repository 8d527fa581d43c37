//! Normalization of raw run (`w:rPr`) and paragraph (`w:pPr`) property sets.
//!
//! Every function here is total: a property that is missing or cannot be
//! parsed comes back as absent instead of failing the document.

use crate::model::{Alignment, ParagraphStyle, RunStyle};

/// Read access to one raw property set, addressed by property element name
/// (`b`, `sz`, `rFonts`, `jc`, ...) and attribute local name (`val`, `ascii`, ...).
pub trait PropertySet {
    fn has(&self, name: &str) -> bool;
    fn value(&self, name: &str, attr: &str) -> Option<&str>;
}

impl<T: PropertySet> PropertySet for Option<T> {
    fn has(&self, name: &str) -> bool {
        self.as_ref().is_some_and(|props| props.has(name))
    }

    fn value(&self, name: &str, attr: &str) -> Option<&str> {
        self.as_ref().and_then(|props| props.value(name, attr))
    }
}

impl<T: PropertySet + ?Sized> PropertySet for &T {
    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }

    fn value(&self, name: &str, attr: &str) -> Option<&str> {
        (**self).value(name, attr)
    }
}

pub fn run_style(props: &impl PropertySet) -> RunStyle {
    RunStyle {
        bold: toggle(props, "b"),
        italic: toggle(props, "i"),
        underline: underline(props),
        font_size_pt: props.value("sz", "val").and_then(half_points_to_pt),
        font_family: font_family(props),
        color_hex: props.value("color", "val").and_then(normalize_color),
    }
}

pub fn paragraph_style(props: &impl PropertySet) -> ParagraphStyle {
    ParagraphStyle {
        alignment: props.value("jc", "val").and_then(parse_alignment),
        margin_top_pt: props.value("spacing", "before").and_then(twips_to_pt),
        margin_bottom_pt: props.value("spacing", "after").and_then(twips_to_pt),
    }
}

/// WML toggle: present with no `val`, or a `val` other than an explicit off.
fn toggle(props: &impl PropertySet, name: &str) -> bool {
    props.has(name)
        && props
            .value(name, "val")
            .is_none_or(|v| !matches!(v, "0" | "false" | "off"))
}

fn underline(props: &impl PropertySet) -> bool {
    props.has("u")
        && props
            .value("u", "val")
            .is_none_or(|v| v != "none" && v != "false")
}

fn font_family(props: &impl PropertySet) -> Option<String> {
    let non_empty = |attr| {
        props
            .value("rFonts", attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    non_empty("ascii")
        .or_else(|| non_empty("eastAsia"))
        .map(str::to_string)
}

/// `w:sz` is in half-points; keeps one decimal.
pub fn half_points_to_pt(raw: &str) -> Option<f32> {
    let half_points = raw.trim().parse::<f32>().ok()?;
    if !half_points.is_finite() || half_points <= 0.0 {
        log::debug!("Ignoring font size {raw:?}");
        return None;
    }
    Some((half_points / 2.0 * 10.0).round() / 10.0)
}

/// Spacing values are in twentieths of a point.
pub fn twips_to_pt(raw: &str) -> Option<f32> {
    let twips = raw.trim().parse::<f32>().ok()?;
    if !twips.is_finite() || twips < 0.0 {
        log::debug!("Ignoring spacing {raw:?}");
        return None;
    }
    Some(twips / 20.0)
}

/// Lowercase six-digit hex, or `None` for `auto`, black, and anything malformed.
pub fn normalize_color(raw: &str) -> Option<String> {
    let val = raw.trim();
    if val.eq_ignore_ascii_case("auto")
        || val.len() != 6
        || !val.chars().all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }
    let hex = val.to_ascii_lowercase();
    (hex != "000000").then_some(hex)
}

pub fn parse_alignment(val: &str) -> Option<Alignment> {
    match val {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "justify" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}
