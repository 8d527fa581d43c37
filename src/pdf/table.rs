use super::css::BoxStyle;
use super::layout::{FlowParagraph, Pager, Piece, TextLine, build_lines, draw_line};
use super::writer::DocumentWriter;

#[derive(Clone, Debug, Default)]
pub(super) struct FlowCell {
    pub(super) paragraphs: Vec<FlowParagraph>,
    pub(super) style: BoxStyle,
}

#[derive(Clone, Debug, Default)]
pub(super) struct FlowTable {
    pub(super) rows: Vec<Vec<FlowCell>>,
    pub(super) style: BoxStyle,
}

/// Minimum height of a row whose cells hold no lines at all.
const EMPTY_ROW_HEIGHT: f32 = 14.0;

/// Start from equal columns, then widen the ones whose longest unbreakable
/// word would not fit, taking space from the others. Total width is preserved.
fn auto_fit_columns(table: &FlowTable, ncols: usize, total: f32) -> Vec<f32> {
    let mut widths = vec![total / ncols as f32; ncols];
    let mut min_widths = vec![0.0f32; ncols];

    for row in &table.rows {
        for (ci, cell) in row.iter().enumerate().take(ncols) {
            let padding = 2.0 * cell.style.padding;
            for para in &cell.paragraphs {
                for piece in &para.pieces {
                    let Piece::Text { text, style } = piece else {
                        continue;
                    };
                    let face = style.face();
                    for word in text.split_whitespace() {
                        min_widths[ci] = min_widths[ci].max(face.text_width(word, style.size) + padding);
                    }
                }
            }
        }
    }

    let mut extra_needed: f32 = 0.0;
    let mut shrinkable: f32 = 0.0;
    for i in 0..ncols {
        if min_widths[i] > widths[i] {
            extra_needed += min_widths[i] - widths[i];
            widths[i] = min_widths[i];
        } else {
            shrinkable += widths[i] - min_widths[i];
        }
    }

    if extra_needed > 0.0 && shrinkable > 0.0 {
        let factor = extra_needed.min(shrinkable) / shrinkable;
        for i in 0..ncols {
            if widths[i] > min_widths[i] {
                let available = widths[i] - min_widths[i];
                widths[i] -= available * factor;
            }
        }
        let new_total: f32 = widths.iter().sum();
        if (new_total - total).abs() > 0.01 {
            let scale = total / new_total;
            for w in &mut widths {
                *w *= scale;
            }
        }
    }

    widths
}

struct CellLayout {
    /// Per paragraph: its lines and the gap above it.
    paragraphs: Vec<(Vec<TextLine>, f32)>,
    height: f32,
}

fn layout_cell(cell: &FlowCell, width: f32, max_height: f32) -> CellLayout {
    let inner_w = (width - 2.0 * cell.style.padding).max(1.0);
    let mut height = 2.0 * cell.style.padding;
    let mut paragraphs = Vec::with_capacity(cell.paragraphs.len());
    let mut prev_bottom: Option<f32> = None;

    for para in &cell.paragraphs {
        let gap = prev_bottom.map_or(0.0, |b| b.max(para.style.margin_top));
        let lines = build_lines(para, inner_w, max_height);
        height += gap + lines.iter().map(TextLine::height).sum::<f32>();
        prev_bottom = Some(para.style.margin_bottom);
        paragraphs.push((lines, gap));
    }

    CellLayout { paragraphs, height }
}

/// Lay out a table row by row. Rows are never split across pages; a row taller
/// than a page is placed on its own page and overflows the bottom margin.
pub(super) fn place_table(pager: &mut Pager, writer: &mut DocumentWriter, table: &FlowTable) {
    let ncols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    pager.open_block(table.style.margin_top);
    if ncols == 0 {
        pager.close_block(table.style.margin_bottom);
        return;
    }

    let col_widths = auto_fit_columns(table, ncols, pager.width);
    let max_height = pager.content_height();

    for (ri, row) in table.rows.iter().enumerate() {
        let layouts: Vec<CellLayout> = row
            .iter()
            .zip(&col_widths)
            .map(|(cell, &w)| layout_cell(cell, w, max_height))
            .collect();
        let row_h = layouts
            .iter()
            .map(|l| l.height)
            .fold(0.0f32, f32::max)
            .max(EMPTY_ROW_HEIGHT);

        pager.ensure(row_h);
        log::debug!(
            "TABLE row={} row_h={:.2} cells={} top={:.2}",
            ri,
            row_h,
            row.len(),
            pager.cursor
        );

        let row_top = pager.cursor;
        let mut cell_x = pager.left;
        for ((cell, layout), &col_w) in row.iter().zip(&layouts).zip(&col_widths) {
            let padding = cell.style.padding;
            let mut y = row_top - padding;
            for ((lines, gap), para) in layout.paragraphs.iter().zip(&cell.paragraphs) {
                y -= gap;
                let last = lines.len().saturating_sub(1);
                for (li, line) in lines.iter().enumerate() {
                    draw_line(
                        &mut pager.current,
                        writer,
                        line,
                        para.style.alignment,
                        cell_x + padding,
                        (col_w - 2.0 * padding).max(1.0),
                        y,
                        li == last,
                    );
                    y -= line.height();
                }
            }

            if cell.style.border_width > 0.0 {
                let content = &mut pager.current;
                content.save_state();
                content.set_line_width(cell.style.border_width);
                if let Some([r, g, b]) = cell.style.border_color {
                    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
                }
                content.rect(cell_x, row_top - row_h, col_w, row_h);
                content.stroke();
                content.restore_state();
            }
            cell_x += col_w;
        }

        pager.cursor -= row_h;
    }

    pager.close_block(table.style.margin_bottom);
}
