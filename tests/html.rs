mod common;

use coverdoc::html::{render_document, render_paragraph, render_table};
use coverdoc::{
    Alignment, Block, ContentItem, Image, Paragraph, ParagraphStyle, RunStyle, Table, TableCell,
    TableRow,
};

fn run(text: &str, style: RunStyle) -> ContentItem {
    ContentItem::TextRun {
        text: text.to_string(),
        style,
    }
}

fn para(items: Vec<ContentItem>) -> Paragraph {
    Paragraph {
        items,
        style: ParagraphStyle::default(),
    }
}

#[test]
fn document_is_well_formed_and_styled() {
    let blocks = vec![Block::Paragraph(para(vec![run("Hello", RunStyle::default())]))];
    let html = render_document(&blocks);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<meta charset=\"utf-8\"/>"));
    assert!(html.contains("border-collapse: collapse"));
    assert!(html.contains("max-width: 100%"));
    assert!(html.contains("<p><span>Hello</span></p>"));

    let xml = html.trim_start_matches("<!DOCTYPE html>");
    roxmltree::Document::parse(xml).expect("markup parses as XML");
}

#[test]
fn run_formatting_becomes_inline_css() {
    let style = RunStyle {
        bold: true,
        italic: true,
        underline: true,
        font_size_pt: Some(10.5),
        font_family: Some("Calibri".into()),
        color_hex: Some("ff0000".into()),
    };
    let html = render_paragraph(&para(vec![run("x", style)]));
    assert_eq!(
        html,
        "<p><span style=\"font-weight: bold; font-style: italic; text-decoration: underline; \
         font-size: 10.5pt; font-family: 'Calibri'; color: #ff0000\">x</span></p>"
    );
}

#[test]
fn paragraph_style_becomes_inline_css() {
    let p = Paragraph {
        items: vec![run("centered", RunStyle::default())],
        style: ParagraphStyle {
            alignment: Some(Alignment::Center),
            margin_top_pt: Some(12.0),
            margin_bottom_pt: Some(0.0),
        },
    };
    let html = render_paragraph(&p);
    assert!(html.starts_with(
        "<p style=\"text-align: center; margin-top: 12pt; margin-bottom: 0pt\">"
    ));
}

#[test]
fn text_is_escaped_once() {
    let html = render_paragraph(&para(vec![run("a < b && c > d &amp;", RunStyle::default())]));
    assert!(html.contains("a &lt; b &amp;&amp; c &gt; d &amp;amp;"));
}

#[test]
fn line_breaks_become_br() {
    let html = render_paragraph(&para(vec![run("one\ntwo", RunStyle::default())]));
    assert!(html.contains("one<br/>two"));
}

#[test]
fn blank_paragraphs_are_omitted() {
    let blank = para(vec![run("  \t", RunStyle::default())]);
    assert_eq!(render_paragraph(&blank), "");
    let html = render_document(&[Block::Paragraph(blank), Block::Paragraph(para(vec![]))]);
    assert!(!html.contains("<p"));
}

#[test]
fn raster_images_are_inlined_and_others_skipped() {
    let png = common::png(2, 2);
    let html = render_paragraph(&para(vec![
        ContentItem::Image(Image {
            bytes: png,
            media_type: "image/png".into(),
        }),
        ContentItem::Image(Image {
            bytes: vec![1, 0, 0, 0],
            media_type: "image/x-emf".into(),
        }),
    ]));
    assert_eq!(html.matches("<img ").count(), 1);
    assert!(html.contains("src=\"data:image/png;base64,iVBORw0KGgo"));
    assert!(!html.contains("x-emf"));
}

#[test]
fn empty_cells_keep_a_placeholder() {
    let table = Table {
        rows: vec![TableRow {
            cells: vec![
                TableCell {
                    paragraphs: vec![para(vec![run("Name", RunStyle::default())])],
                },
                TableCell {
                    paragraphs: vec![para(vec![run(" ", RunStyle::default())])],
                },
                TableCell { paragraphs: vec![] },
            ],
        }],
    };
    let html = render_table(&table);
    assert_eq!(
        html,
        "<table><tr><td><p><span>Name</span></p></td><td>&#160;</td><td>&#160;</td></tr></table>"
    );
}

#[test]
fn docx_converts_to_html() {
    let docx = common::DocxBuilder::new()
        .body(&common::paragraph(&common::text_run("Intro &amp; scope")))
        .build();
    let html = coverdoc::convert_docx_to_html(&docx).unwrap();
    assert!(html.contains("<span>Intro &amp; scope</span>"));
}

fn emf() -> ContentItem {
    ContentItem::Image(Image {
        bytes: vec![1, 0, 0, 0],
        media_type: "image/x-emf".into(),
    })
}

#[test]
fn paragraph_with_only_vector_media_is_omitted() {
    let p = Paragraph {
        items: vec![emf(), run(" ", RunStyle::default())],
        style: ParagraphStyle {
            margin_top_pt: Some(12.0),
            ..ParagraphStyle::default()
        },
    };
    assert_eq!(render_paragraph(&p), "");
}

#[test]
fn cell_with_only_vector_media_keeps_a_placeholder() {
    let table = Table {
        rows: vec![TableRow {
            cells: vec![TableCell {
                paragraphs: vec![Paragraph {
                    items: vec![emf()],
                    style: ParagraphStyle {
                        margin_top_pt: Some(12.0),
                        ..ParagraphStyle::default()
                    },
                }],
            }],
        }],
    };
    assert_eq!(render_table(&table), "<table><tr><td>&#160;</td></tr></table>");
}

#[test]
fn each_run_declaration_appears_once() {
    let style = RunStyle {
        bold: true,
        italic: true,
        font_size_pt: Some(12.5),
        ..RunStyle::default()
    };
    let html = render_paragraph(&para(vec![run("twelve and a half", style)]));
    for decl in ["font-weight: bold", "font-style: italic", "font-size: 12.5pt"] {
        assert_eq!(html.matches(decl).count(), 1, "{decl} in {html}");
    }
    assert!(!html.contains("text-decoration"));
}

#[test]
fn docx_colour_is_lowercased_in_css() {
    let docx = common::DocxBuilder::new()
        .body(&common::paragraph(
            r#"<w:r><w:rPr><w:color w:val="1A2B3C"/></w:rPr><w:t>tinted</w:t></w:r>"#,
        ))
        .build();
    let html = coverdoc::convert_docx_to_html(&docx).unwrap();
    assert!(html.contains("<span style=\"color: #1a2b3c\">tinted</span>"), "{html}");
}
