use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontFace, to_winansi_bytes};
use crate::model::Alignment;

use super::css::{BoxStyle, TextStyle};
use super::writer::{DocumentWriter, PlacedImage};

/// Share of the font size above the baseline, and below it, for one text line.
const ASCENT: f32 = 0.9;
const DESCENT: f32 = 0.25;

/// Inline content of one paragraph, in order.
#[derive(Clone, Debug)]
pub(super) enum Piece {
    Text { text: String, style: TextStyle },
    Break { size: f32 },
    Image(PlacedImage),
}

#[derive(Clone, Debug)]
pub(super) struct FlowParagraph {
    pub(super) pieces: Vec<Piece>,
    pub(super) style: BoxStyle,
    /// Font size of the paragraph element, used to size empty lines.
    pub(super) font_size: f32,
}

pub(super) struct WordChunk {
    pub(super) text: String,
    pub(super) face: FontFace,
    pub(super) font_size: f32,
    pub(super) color: Option<[u8; 3]>,
    pub(super) underline: bool,
    pub(super) x_offset: f32, // x relative to line start
    pub(super) width: f32,
    pub(super) image_name: Option<String>,
    pub(super) image_height: f32,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
    pub(super) total_width: f32,
    pub(super) ascent: f32,
    pub(super) descent: f32,
    /// Ended by an explicit `<br/>`; never stretched when justifying.
    pub(super) forced_break: bool,
}

impl TextLine {
    pub(super) fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

fn finish_line(chunks: &mut Vec<WordChunk>, forced_break: bool, empty_size: f32) -> TextLine {
    let total_width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
    let (ascent, descent) = if chunks.is_empty() {
        (empty_size * ASCENT, empty_size * DESCENT)
    } else {
        chunks.iter().fold((0.0f32, 0.0f32), |(a, d), c| {
            if c.image_name.is_some() {
                (a.max(c.image_height), d)
            } else {
                (a.max(c.font_size * ASCENT), d.max(c.font_size * DESCENT))
            }
        })
    };
    TextLine {
        chunks: std::mem::take(chunks),
        total_width,
        ascent,
        descent,
        forced_break,
    }
}

/// Scale an image down (never up) to fit the available box.
fn fit_image(img: &PlacedImage, max_width: f32, max_height: f32) -> (f32, f32) {
    let scale = (max_width / img.width)
        .min(max_height / img.height)
        .min(1.0);
    (img.width * scale, img.height * scale)
}

/// Layout pieces into wrapped lines.
/// No space is inserted between pieces unless the preceding text ended with
/// whitespace or the next one starts with it ("bold" + ", " → "bold,").
pub(super) fn build_lines(
    paragraph: &FlowParagraph,
    max_width: f32,
    max_height: f32,
) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_chunks: Vec<WordChunk> = Vec::new();
    let mut current_x: f32 = 0.0;
    let mut prev_ended_with_ws = false;
    let mut prev_space_w: f32 = 0.0;
    let mut empty_size = paragraph.font_size;

    for piece in &paragraph.pieces {
        match piece {
            Piece::Break { size } => {
                lines.push(finish_line(&mut current_chunks, true, *size));
                current_x = 0.0;
                prev_ended_with_ws = false;
            }
            Piece::Image(img) => {
                let (img_w, img_h) = fit_image(img, max_width, max_height);
                let need_space = !current_chunks.is_empty() && prev_ended_with_ws;
                let proposed_x = if need_space {
                    current_x + prev_space_w
                } else {
                    current_x
                };
                if !current_chunks.is_empty() && proposed_x + img_w > max_width {
                    lines.push(finish_line(&mut current_chunks, false, empty_size));
                    current_x = 0.0;
                } else {
                    current_x = proposed_x;
                }
                current_chunks.push(WordChunk {
                    text: String::new(),
                    face: FontFace::new(crate::fonts::Family::Helvetica, false, false),
                    font_size: 0.0,
                    color: None,
                    underline: false,
                    x_offset: current_x,
                    width: img_w,
                    image_name: Some(img.name.clone()),
                    image_height: img_h,
                });
                current_x += img_w;
                prev_ended_with_ws = false;
            }
            Piece::Text { text, style } => {
                let face = style.face();
                let space_w = face.space_width(style.size);
                let starts_with_ws = text.starts_with(char::is_whitespace);
                empty_size = style.size;

                for (i, word) in text.split_whitespace().enumerate() {
                    let ww = face.text_width(word, style.size);
                    let need_space = !current_chunks.is_empty()
                        && (i > 0 || starts_with_ws || prev_ended_with_ws);
                    // Within a run or on leading whitespace the space belongs to this
                    // run; trailing whitespace of the previous run uses its width.
                    let effective_space_w = if i > 0 || starts_with_ws {
                        space_w
                    } else {
                        prev_space_w
                    };
                    let proposed_x = if need_space {
                        current_x + effective_space_w
                    } else {
                        current_x
                    };

                    if !current_chunks.is_empty() && proposed_x + ww > max_width {
                        lines.push(finish_line(&mut current_chunks, false, empty_size));
                        current_x = 0.0;
                    } else {
                        current_x = proposed_x;
                    }

                    current_chunks.push(WordChunk {
                        text: word.to_string(),
                        face,
                        font_size: style.size,
                        color: style.color,
                        underline: style.underline,
                        x_offset: current_x,
                        width: ww,
                        image_name: None,
                        image_height: 0.0,
                    });
                    current_x += ww;
                }

                if !text.is_empty() {
                    prev_ended_with_ws = text.ends_with(char::is_whitespace);
                    prev_space_w = space_w;
                }
            }
        }
    }

    if !current_chunks.is_empty() || lines.is_empty() {
        lines.push(finish_line(&mut current_chunks, false, empty_size));
    }
    lines
}

fn set_fill(content: &mut Content, color: Option<[u8; 3]>) {
    match color {
        Some([r, g, b]) => {
            content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        }
        None => {
            content.set_fill_gray(0.0);
        }
    }
}

/// Draw one line whose top edge is at `top_y`, applying the paragraph alignment.
/// The last line of a justified paragraph stays left-aligned.
pub(super) fn draw_line(
    content: &mut Content,
    writer: &mut DocumentWriter,
    line: &TextLine,
    alignment: Alignment,
    margin_left: f32,
    text_width: f32,
    top_y: f32,
    is_last_line: bool,
) {
    let y = top_y - line.ascent;

    let is_justified = alignment == Alignment::Justify
        && !is_last_line
        && !line.forced_break
        && line.chunks.len() > 1;

    let line_start_x = match alignment {
        Alignment::Center => margin_left + (text_width - line.total_width) / 2.0,
        Alignment::Right => margin_left + text_width - line.total_width,
        Alignment::Left | Alignment::Justify => margin_left,
    };

    let extra_per_gap = if is_justified {
        (text_width - line.total_width) / (line.chunks.len() - 1) as f32
    } else {
        0.0
    };

    let mut decorations: Vec<(f32, f32, f32, f32, Option<[u8; 3]>)> = Vec::new();
    let mut current_color: Option<[u8; 3]> = None;
    let mut cur_font_name = String::new();
    let mut cur_font_size: f32 = -1.0;

    let has_text_chunks = line
        .chunks
        .iter()
        .any(|c| c.image_name.is_none() && !c.text.is_empty());

    if has_text_chunks {
        content.begin_text();
        let mut td_x = 0.0_f32;
        let mut td_y = 0.0_f32;

        for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
            if chunk.image_name.is_some() {
                continue;
            }
            let x = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;

            if chunk.color != current_color {
                set_fill(content, chunk.color);
                current_color = chunk.color;
            }

            let font_name = writer.font(chunk.face);
            if cur_font_name != font_name || cur_font_size != chunk.font_size {
                content.set_font(Name(font_name.as_bytes()), chunk.font_size);
                cur_font_name = font_name;
                cur_font_size = chunk.font_size;
            }

            content.next_line(x - td_x, y - td_y);
            td_x = x;
            td_y = y;
            content.show(Str(&to_winansi_bytes(&chunk.text)));

            if chunk.underline {
                let thick = (chunk.font_size * 0.05).max(0.5);
                let ul_y = y - chunk.font_size * 0.12;
                decorations.push((x, ul_y - thick, chunk.width, thick, chunk.color));
            }
        }
        content.end_text();
    }

    for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
        if let Some(ref img_name) = chunk.image_name {
            let x = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;
            content.save_state();
            content.transform([chunk.width, 0.0, 0.0, chunk.image_height, x, y]);
            content.x_object(Name(img_name.as_bytes()));
            content.restore_state();
        }
    }

    for &(dx, dy, dw, dh, dcolor) in &decorations {
        if dcolor != current_color {
            set_fill(content, dcolor);
            current_color = dcolor;
        }
        content.rect(dx, dy, dw, dh).fill_nonzero();
    }
    if current_color.is_some() {
        content.set_fill_gray(0.0);
    }
}

/// Vertical cursor over a sequence of fixed-size pages.
pub(super) struct Pager {
    pages: Vec<Content>,
    pub(super) current: Content,
    top: f32,
    bottom: f32,
    pub(super) left: f32,
    pub(super) width: f32,
    pub(super) cursor: f32,
    pending_margin: f32,
}

impl Pager {
    pub(super) fn new(page_width: f32, page_height: f32, margin: f32) -> Self {
        let margin = margin.clamp(0.0, page_width.min(page_height) / 2.0 - 36.0);
        Self {
            pages: Vec::new(),
            current: Content::new(),
            top: page_height - margin,
            bottom: margin,
            left: margin,
            width: page_width - 2.0 * margin,
            cursor: page_height - margin,
            pending_margin: 0.0,
        }
    }

    pub(super) fn content_height(&self) -> f32 {
        self.top - self.bottom
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.top).abs() < 0.01
    }

    pub(super) fn new_page(&mut self) {
        self.pages.push(std::mem::replace(&mut self.current, Content::new()));
        self.cursor = self.top;
        self.pending_margin = 0.0;
    }

    /// Start a new page unless `height` fits below the cursor. Content taller
    /// than a whole page is placed at the top of a fresh page and overflows.
    pub(super) fn ensure(&mut self, height: f32) {
        if !self.at_page_top() && self.cursor - height < self.bottom {
            self.new_page();
        }
    }

    /// Collapse the previous block's bottom margin with this block's top margin.
    pub(super) fn open_block(&mut self, margin_top: f32) {
        let gap = self.pending_margin.max(margin_top);
        self.pending_margin = 0.0;
        if self.at_page_top() {
            return;
        }
        if self.cursor - gap <= self.bottom {
            self.new_page();
        } else {
            self.cursor -= gap;
        }
    }

    pub(super) fn close_block(&mut self, margin_bottom: f32) {
        self.pending_margin = margin_bottom;
    }

    pub(super) fn into_pages(mut self) -> Vec<Content> {
        self.pages.push(self.current);
        self.pages
    }
}

pub(super) fn place_paragraph(pager: &mut Pager, writer: &mut DocumentWriter, paragraph: &FlowParagraph) {
    let lines = build_lines(paragraph, pager.width, pager.content_height());
    pager.open_block(paragraph.style.margin_top);
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter().enumerate() {
        pager.ensure(line.height());
        let (left, width, top) = (pager.left, pager.width, pager.cursor);
        draw_line(
            &mut pager.current,
            writer,
            line,
            paragraph.style.alignment,
            left,
            width,
            top,
            i == last,
        );
        pager.cursor -= line.height();
    }
    pager.close_block(paragraph.style.margin_bottom);
}
