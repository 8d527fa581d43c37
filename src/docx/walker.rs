use crate::model::{Block, ContentItem, Paragraph, Table, TableCell, TableRow};

use super::formatting::{paragraph_style, run_style};
use super::source::{DocumentSource, ElementKind};

/// Walk the body in document order, yielding one block per paragraph or table.
/// Other body elements are skipped.
pub fn walk<S: DocumentSource>(source: &S) -> Vec<Block> {
    let mut blocks = Vec::new();
    for element in source.iterate_body_blocks() {
        match source.kind(element) {
            ElementKind::Paragraph => {
                blocks.push(Block::Paragraph(walk_paragraph(source, element)));
            }
            ElementKind::Table => blocks.push(Block::Table(walk_table(source, element))),
            ElementKind::Other(name) => log::debug!("Skipping body element <{name}>"),
        }
    }
    blocks
}

fn walk_paragraph<'a, S: DocumentSource>(source: &'a S, paragraph: S::Element<'a>) -> Paragraph {
    let style = paragraph_style(&source.paragraph_properties(paragraph));
    let mut items = Vec::new();

    for run in source.iterate_runs(paragraph) {
        let text = source.run_text(run);
        if !text.is_empty() {
            items.push(ContentItem::TextRun {
                text,
                style: run_style(&source.run_properties(run)),
            });
        }
        for ref_id in source.run_media_refs(run) {
            match source.resolve_media(ref_id) {
                Some(image) => items.push(ContentItem::Image(image)),
                None => log::warn!("Dropping image {ref_id}: reference does not resolve"),
            }
        }
    }

    Paragraph { items, style }
}

fn walk_table<'a, S: DocumentSource>(source: &'a S, table: S::Element<'a>) -> Table {
    let rows = source
        .iterate_rows(table)
        .into_iter()
        .map(|row| TableRow {
            cells: source
                .iterate_cells(row)
                .into_iter()
                .map(|cell| walk_cell(source, cell))
                .collect(),
        })
        .collect();
    Table { rows }
}

fn walk_cell<'a, S: DocumentSource>(source: &'a S, cell: S::Element<'a>) -> TableCell {
    let mut paragraphs = Vec::new();
    for element in source.iterate_cell_blocks(cell) {
        match source.kind(element) {
            ElementKind::Paragraph => paragraphs.push(walk_paragraph(source, element)),
            ElementKind::Table => log::debug!("Skipping nested table inside a table cell"),
            ElementKind::Other(_) => {}
        }
    }
    TableCell { paragraphs }
}
