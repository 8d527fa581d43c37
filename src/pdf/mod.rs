mod css;
mod image;
mod layout;
mod table;
pub(crate) mod writer;

use std::time::Instant;

use base64::Engine as _;
use roxmltree::Node;

use crate::Options;
use crate::error::Error;
use crate::model::{Alignment, PageSize, PaginatedDocument};

use css::{BoxStyle, Stylesheet, TextStyle, apply_box, apply_text, parse_declarations};
use layout::{FlowParagraph, Pager, Piece, place_paragraph};
use table::{FlowCell, FlowTable, place_table};
use writer::DocumentWriter;

/// Turns HTML markup into a paginated PDF.
///
/// Implementations are shared across requests and may be driven from a worker
/// thread, hence `Send + Sync`.
pub trait FixedLayoutRenderer: Send + Sync {
    fn render(&self, markup: &str) -> Result<PaginatedDocument, Error>;
}

/// Built-in renderer for the markup produced by [`crate::html::render_document`].
#[derive(Clone, Copy, Debug)]
pub struct PdfRenderer {
    page_size: PageSize,
    margin_pt: f32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(PageSize::Letter, 72.0)
    }
}

impl PdfRenderer {
    pub fn new(page_size: PageSize, margin_pt: f32) -> Self {
        Self {
            page_size,
            margin_pt,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.page_size, options.margin_pt)
    }
}

impl FixedLayoutRenderer for PdfRenderer {
    fn render(&self, markup: &str) -> Result<PaginatedDocument, Error> {
        let t0 = Instant::now();
        let dom = roxmltree::Document::parse(strip_doctype(markup))
            .map_err(|e| Error::Render(format!("markup is not well-formed: {e}")))?;

        let css: String = dom
            .descendants()
            .filter(|n| n.has_tag_name("style"))
            .filter_map(|n| n.text())
            .collect::<Vec<_>>()
            .join("\n");
        let sheet = Stylesheet::parse(&css);
        let body = dom
            .descendants()
            .find(|n| n.has_tag_name("body"))
            .unwrap_or_else(|| dom.root_element());

        let mut base = TextStyle::default();
        apply_text(&mut base, sheet.rule("body"));
        apply_text(&mut base, &inline_style(body));

        let mut writer = DocumentWriter::new(self.page_size);
        let blocks = {
            let mut builder = FlowBuilder {
                sheet: &sheet,
                writer: &mut writer,
            };
            builder.blocks(body, &base)
        };
        let t_flow = t0.elapsed();

        let mut pager = Pager::new(writer.page_width(), writer.page_height(), self.margin_pt);
        for block in &blocks {
            match block {
                FlowBlock::Paragraph(p) => place_paragraph(&mut pager, &mut writer, p),
                FlowBlock::Table(t) => place_table(&mut pager, &mut writer, t),
            }
        }
        let doc = writer.finish(pager.into_pages());

        log::info!(
            "Render phases: flow={:.1}ms, layout={:.1}ms ({} blocks, {} pages, {} bytes)",
            t_flow.as_secs_f64() * 1000.0,
            (t0.elapsed() - t_flow).as_secs_f64() * 1000.0,
            blocks.len(),
            doc.page_count,
            doc.bytes.len(),
        );
        Ok(doc)
    }
}

/// roxmltree rejects DTDs it cannot resolve, and an HTML5 doctype carries nothing we need.
fn strip_doctype(markup: &str) -> &str {
    let trimmed = markup.trim_start();
    let is_doctype = trimmed
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));
    if is_doctype && let Some(end) = trimmed.find('>') {
        return &trimmed[end + 1..];
    }
    markup
}

fn inline_style(node: Node) -> Vec<(String, String)> {
    node.attribute("style")
        .map(parse_declarations)
        .unwrap_or_default()
}

enum FlowBlock {
    Paragraph(FlowParagraph),
    Table(FlowTable),
}

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "blockquote" | "table"
    )
}

struct FlowBuilder<'s, 'w> {
    sheet: &'s Stylesheet,
    writer: &'w mut DocumentWriter,
}

impl FlowBuilder<'_, '_> {
    fn element_styles(&self, node: Node, parent: &TextStyle) -> (TextStyle, BoxStyle) {
        let name = node.tag_name().name();
        let inline = inline_style(node);
        let mut text = parent.clone();
        if matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th") {
            text.bold = true;
        }
        apply_text(&mut text, self.sheet.rule(name));
        apply_text(&mut text, &inline);
        let mut boxed = BoxStyle::default();
        apply_box(&mut boxed, self.sheet.rule(name), text.size);
        apply_box(&mut boxed, &inline, text.size);
        (text, boxed)
    }

    /// Block-level children of `parent`. Loose inline content between blocks is
    /// gathered into anonymous paragraphs.
    fn blocks(&mut self, parent: Node, style: &TextStyle) -> Vec<FlowBlock> {
        let mut blocks = Vec::new();
        let mut loose: Vec<Piece> = Vec::new();

        for child in parent.children() {
            if child.is_element() && is_block_element(child.tag_name().name()) {
                self.flush_loose(&mut loose, style, &mut blocks);
                match child.tag_name().name() {
                    "table" => blocks.push(FlowBlock::Table(self.table(child, style))),
                    _ => blocks.push(FlowBlock::Paragraph(self.paragraph(child, style))),
                }
            } else if child.is_element() || child.is_text() {
                self.inline(child, style, &mut loose);
            }
        }
        self.flush_loose(&mut loose, style, &mut blocks);
        blocks
    }

    fn flush_loose(&mut self, loose: &mut Vec<Piece>, style: &TextStyle, out: &mut Vec<FlowBlock>) {
        let has_content = loose.iter().any(|p| match p {
            Piece::Text { text, .. } => !text.trim().is_empty(),
            Piece::Break { .. } | Piece::Image(_) => true,
        });
        if has_content {
            let mut boxed = BoxStyle::default();
            apply_box(&mut boxed, self.sheet.rule("p"), style.size);
            out.push(FlowBlock::Paragraph(FlowParagraph {
                pieces: std::mem::take(loose),
                style: boxed,
                font_size: style.size,
            }));
        }
        loose.clear();
    }

    fn paragraph(&mut self, node: Node, parent: &TextStyle) -> FlowParagraph {
        let (text, style) = self.element_styles(node, parent);
        let mut pieces = Vec::new();
        for child in node.children() {
            self.inline(child, &text, &mut pieces);
        }
        FlowParagraph {
            pieces,
            style,
            font_size: text.size,
        }
    }

    fn inline(&mut self, node: Node, style: &TextStyle, out: &mut Vec<Piece>) {
        if node.is_text() {
            if let Some(text) = node.text().filter(|t| !t.is_empty()) {
                out.push(Piece::Text {
                    text: text.to_string(),
                    style: style.clone(),
                });
            }
            return;
        }
        if !node.is_element() {
            return;
        }

        match node.tag_name().name() {
            "br" => out.push(Piece::Break { size: style.size }),
            "img" => {
                let src = node.attribute("src").unwrap_or_default();
                if let Some(data) = decode_data_uri(src)
                    && let Some(placed) = self.writer.embed_image(&data)
                {
                    out.push(Piece::Image(placed));
                }
            }
            "style" | "script" | "head" | "title" => {}
            "table" => log::debug!("Skipping table nested in inline content"),
            name => {
                let mut inner = style.clone();
                match name {
                    "b" | "strong" => inner.bold = true,
                    "i" | "em" => inner.italic = true,
                    "u" => inner.underline = true,
                    _ => {}
                }
                apply_text(&mut inner, self.sheet.rule(name));
                apply_text(&mut inner, &inline_style(node));
                for child in node.children() {
                    self.inline(child, &inner, out);
                }
            }
        }
    }

    fn table(&mut self, node: Node, parent: &TextStyle) -> FlowTable {
        let (text, style) = self.element_styles(node, parent);
        let mut rows = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "tr" => rows.push(self.row(child, &text)),
                "thead" | "tbody" | "tfoot" => {
                    for tr in child.children().filter(|n| n.has_tag_name("tr")) {
                        rows.push(self.row(tr, &text));
                    }
                }
                other => log::debug!("Ignoring <{other}> inside table"),
            }
        }
        FlowTable { rows, style }
    }

    fn row(&mut self, node: Node, parent: &TextStyle) -> Vec<FlowCell> {
        node.children()
            .filter(|n| n.has_tag_name("td") || n.has_tag_name("th"))
            .map(|cell| self.cell(cell, parent))
            .collect()
    }

    fn cell(&mut self, node: Node, parent: &TextStyle) -> FlowCell {
        let (text, style) = self.element_styles(node, parent);
        let paragraphs = self
            .blocks(node, &text)
            .into_iter()
            .filter_map(|block| match block {
                FlowBlock::Paragraph(mut p) => {
                    if p.style.alignment == Alignment::Left {
                        p.style.alignment = style.alignment;
                    }
                    Some(p)
                }
                FlowBlock::Table(_) => {
                    log::debug!("Skipping table nested in a cell");
                    None
                }
            })
            .collect();
        FlowCell { paragraphs, style }
    }
}

/// Bytes of a base64 `data:image/...` URI for a raster format the writer can embed.
/// Anything else is skipped.
fn decode_data_uri(src: &str) -> Option<Vec<u8>> {
    let Some(rest) = src.strip_prefix("data:") else {
        log::debug!("Skipping non-inline image source");
        return None;
    };
    let (header, payload) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    if !matches!(
        media_type,
        "image/png" | "image/jpeg" | "image/jpg" | "image/gif" | "image/bmp" | "image/webp"
    ) {
        log::debug!("Skipping inline image of type {media_type}");
        return None;
    }
    match base64::engine::general_purpose::STANDARD.decode(payload.trim()) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Skipping inline image with invalid base64: {e}");
            None
        }
    }
}
