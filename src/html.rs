//! Markup generation for walked document content.
//!
//! The output is well-formed XHTML-compatible HTML (every element closed,
//! void elements self-closed, `&#160;` instead of named entities) so any
//! HTML engine, or an XML parser, can consume it.

use base64::Engine;

use crate::model::{Block, ContentItem, Image, Paragraph, ParagraphStyle, RunStyle, Table};

/// Stylesheet every rendered document carries.
pub const BASE_STYLESHEET: &str = "\
body { font-family: 'Times New Roman', Times, serif; font-size: 12pt; color: #000000; margin: 0; }
p { margin-top: 0pt; margin-bottom: 6pt; }
table { border-collapse: collapse; width: 100%; margin-bottom: 6pt; }
td { border: 1px solid #000000; padding: 4pt; vertical-align: top; }
img { max-width: 100%; }
";

pub fn render_document(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<style>\n");
    out.push_str(BASE_STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");
    for block in blocks {
        let element = match block {
            Block::Paragraph(paragraph) => render_paragraph(paragraph),
            Block::Table(table) => render_table(table),
        };
        if !element.is_empty() {
            out.push_str(&element);
            out.push('\n');
        }
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// `<p>` for the paragraph, or an empty string when it has no visible content.
pub fn render_paragraph(paragraph: &Paragraph) -> String {
    if paragraph.is_blank() {
        return String::new();
    }
    let mut out = String::from("<p");
    push_style_attr(&mut out, &paragraph_css(&paragraph.style));
    out.push('>');
    for item in &paragraph.items {
        match item {
            ContentItem::TextRun { text, style } => render_run(&mut out, text, style),
            ContentItem::Image(image) => render_image(&mut out, image),
        }
    }
    out.push_str("</p>");
    out
}

pub fn render_table(table: &Table) -> String {
    let mut out = String::from("<table>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in &row.cells {
            out.push_str("<td>");
            if cell.is_blank() {
                out.push_str("&#160;");
            } else {
                for paragraph in &cell.paragraphs {
                    out.push_str(&render_paragraph(paragraph));
                }
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn render_run(out: &mut String, text: &str, style: &RunStyle) {
    out.push_str("<span");
    push_style_attr(out, &run_css(style));
    out.push('>');
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br/>");
        }
        out.push_str(&escape_text(line));
    }
    out.push_str("</span>");
}

fn render_image(out: &mut String, image: &Image) {
    if !image.is_raster() {
        log::debug!("Skipping embedded media of type {}", image.media_type);
        return;
    }
    let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    out.push_str("<img src=\"data:");
    out.push_str(&image.media_type);
    out.push_str(";base64,");
    out.push_str(&data);
    out.push_str("\" alt=\"\"/>");
}

fn push_style_attr(out: &mut String, css: &str) {
    if css.is_empty() {
        return;
    }
    out.push_str(" style=\"");
    out.push_str(css);
    out.push('"');
}

/// Escape `&`, `<` and `>`, ampersand first so entities are not escaped twice.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn run_css(style: &RunStyle) -> String {
    let mut decls: Vec<String> = Vec::new();
    if style.bold {
        decls.push("font-weight: bold".into());
    }
    if style.italic {
        decls.push("font-style: italic".into());
    }
    if style.underline {
        decls.push("text-decoration: underline".into());
    }
    if let Some(size) = style.font_size_pt {
        decls.push(format!("font-size: {}pt", format_pt(size)));
    }
    if let Some(family) = &style.font_family {
        decls.push(format!("font-family: '{}'", css_string(family)));
    }
    if let Some(hex) = &style.color_hex {
        decls.push(format!("color: #{hex}"));
    }
    decls.join("; ")
}

pub fn paragraph_css(style: &ParagraphStyle) -> String {
    let mut decls: Vec<String> = Vec::new();
    if let Some(alignment) = style.alignment {
        decls.push(format!("text-align: {}", alignment.css_value()));
    }
    if let Some(top) = style.margin_top_pt {
        decls.push(format!("margin-top: {}pt", format_pt(top)));
    }
    if let Some(bottom) = style.margin_bottom_pt {
        decls.push(format!("margin-bottom: {}pt", format_pt(bottom)));
    }
    decls.join("; ")
}

/// Shortest decimal form: `12`, `12.5`, `0.75`.
fn format_pt(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let s = format!("{rounded:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Font names go inside a single-quoted CSS string inside a double-quoted attribute.
fn css_string(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\\' | '<' | '>' | '&' | ';'))
        .collect()
}
