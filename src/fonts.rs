//! PDF base-14 fonts: family selection, WinAnsi encoding and approximate metrics.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Family {
    Helvetica,
    Times,
    Courier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FontFace {
    pub(crate) family: Family,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
}

impl FontFace {
    pub(crate) const fn new(family: Family, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }

    pub(crate) fn base_font(self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (Family::Helvetica, false, false) => "Helvetica",
            (Family::Helvetica, true, false) => "Helvetica-Bold",
            (Family::Helvetica, false, true) => "Helvetica-Oblique",
            (Family::Helvetica, true, true) => "Helvetica-BoldOblique",
            (Family::Times, false, false) => "Times-Roman",
            (Family::Times, true, false) => "Times-Bold",
            (Family::Times, false, true) => "Times-Italic",
            (Family::Times, true, true) => "Times-BoldItalic",
            (Family::Courier, false, false) => "Courier",
            (Family::Courier, true, false) => "Courier-Bold",
            (Family::Courier, false, true) => "Courier-Oblique",
            (Family::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Width of a single character in 1000-units.
    pub(crate) fn char_width_1000(self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte < 32 {
            return 0.0;
        }
        let base = match self.family {
            Family::Helvetica => helvetica_width(byte),
            Family::Times => times_width(byte),
            Family::Courier => return 600.0,
        };
        if self.bold { base * 1.06 } else { base }
    }

    pub(crate) fn text_width(self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }
}

/// Pick a base-14 family for a CSS `font-family` list or a single DOCX font name.
/// The first name that clearly reads as serif or monospace wins; otherwise Helvetica.
pub(crate) fn family_for(font_family: &str) -> Family {
    const MONO: &[&str] = &["courier", "consolas", "mono", "menlo", "lucida console"];
    const SERIF: &[&str] = &[
        "times", "georgia", "cambria", "garamond", "book antiqua", "palatino", "serif",
        "minion", "baskerville", "century", "bookman",
    ];
    for candidate in font_family.split([',', ';']) {
        let name = candidate.trim().trim_matches(['\'', '"']).to_lowercase();
        if name.is_empty() {
            continue;
        }
        if MONO.iter().any(|m| name.contains(m)) {
            return Family::Courier;
        }
        if name == "sans-serif" || name.contains("sans") {
            return Family::Helvetica;
        }
        if SERIF.iter().any(|s| name.contains(s)) {
            return Family::Times;
        }
        return Family::Helvetica;
    }
    Family::Helvetica
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        0x2010 | 0x2011 => b'-',
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b >= 32)
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em.
fn helvetica_width(b: u8) -> f32 {
    match b {
        32 | 160 => 278.0,                    // space, nbsp
        33..=47 => 333.0,                     // punctuation
        48..=57 => 556.0,                     // digits
        58..=64 => 333.0,                     // more punctuation
        73 | 74 => 278.0,                     // I J (narrow uppercase)
        77 => 833.0,                          // M (wide)
        87 => 944.0,                          // W
        65..=90 => 667.0,                     // uppercase A-Z (average)
        91..=96 => 333.0,                     // brackets etc.
        102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
        109 | 119 => 833.0,                   // m w (wide)
        97..=122 => 556.0,                    // lowercase a-z (average)
        _ => 556.0,
    }
}

/// Approximate Times-Roman widths at 1000 units/em.
fn times_width(b: u8) -> f32 {
    match b {
        32 | 160 => 250.0,
        33..=47 => 333.0,
        48..=57 => 500.0,
        58..=64 => 333.0,
        73 => 333.0,
        74 => 389.0,
        77 => 889.0,
        87 => 944.0,
        65..=90 => 680.0,
        91..=96 => 333.0,
        102 | 105 | 106 | 108 | 116 => 278.0,
        109 => 778.0,
        119 => 722.0,
        97..=122 => 470.0,
        _ => 500.0,
    }
}
