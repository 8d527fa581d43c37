mod common;

use common::{DocxBuilder, MapProps, drawing_run, paragraph, png, text_run};
use coverdoc::docx::parse_bytes;
use coverdoc::{Block, ContentItem, DocumentSource, ElementKind, Error, Image, walk};

fn paragraphs(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p.text()),
            Block::Table(_) => None,
        })
        .collect()
}

#[test]
fn blocks_follow_document_order() {
    common::init_logger();
    let table = format!(
        "<w:tbl><w:tblPr/><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        paragraph(&text_run("A1")),
        paragraph(&text_run("B1")),
    );
    let docx = DocxBuilder::new()
        .body(&paragraph(&text_run("first")))
        .body(&table)
        .body(&paragraph(&text_run("last")))
        .build();

    let blocks = parse_bytes(&docx).unwrap();
    assert_eq!(blocks.len(), 3);
    assert!(!blocks[0].is_table());
    assert!(blocks[1].is_table());
    assert_eq!(paragraphs(&blocks), ["first", "last"]);

    let Block::Table(table) = &blocks[1] else {
        unreachable!()
    };
    assert_eq!(table.rows.len(), 1);
    let cells: Vec<String> = table.rows[0]
        .cells
        .iter()
        .map(|c| c.paragraphs[0].text())
        .collect();
    assert_eq!(cells, ["A1", "B1"]);
}

#[test]
fn runs_keep_their_formatting() {
    let body = paragraph(concat!(
        r#"<w:pPr><w:jc w:val="center"/><w:spacing w:after="240"/></w:pPr>"#,
        r#"<w:r><w:t>plain </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:b/><w:sz w:val="28"/><w:color w:val="C00000"/></w:rPr><w:t>bold</w:t></w:r>"#,
    ));
    let blocks = parse_bytes(&DocxBuilder::new().body(&body).build()).unwrap();
    let Block::Paragraph(p) = &blocks[0] else {
        panic!("expected a paragraph")
    };
    assert_eq!(p.style.alignment, Some(coverdoc::Alignment::Center));
    assert_eq!(p.style.margin_bottom_pt, Some(12.0));
    assert_eq!(p.items.len(), 2);

    let ContentItem::TextRun { text, style } = &p.items[1] else {
        panic!("expected a text run")
    };
    assert_eq!(text, "bold");
    assert!(style.bold);
    assert_eq!(style.font_size_pt, Some(14.0));
    assert_eq!(style.color_hex.as_deref(), Some("c00000"));
}

#[test]
fn tabs_and_breaks_become_characters() {
    let body = paragraph(r#"<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r>"#);
    let blocks = parse_bytes(&DocxBuilder::new().body(&body).build()).unwrap();
    assert_eq!(paragraphs(&blocks), ["a\tb\nc"]);
}

#[test]
fn hyperlinks_and_content_controls_are_walked() {
    let body = format!(
        "<w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>",
        paragraph(&format!(
            r#"{}<w:hyperlink r:id="rId9">{}</w:hyperlink><w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>"#,
            text_run("see "),
            text_run("link"),
            text_run("!"),
        ))
    );
    let blocks = parse_bytes(&DocxBuilder::new().body(&body).build()).unwrap();
    assert_eq!(paragraphs(&blocks), ["see link!"]);
}

#[test]
fn embedded_image_resolves_after_text() {
    let body = paragraph(&format!("{}{}", text_run("Figure:"), drawing_run("rId5")));
    let docx = DocxBuilder::new()
        .body(&body)
        .image("rId5", "image1.png", png(4, 3))
        .build();
    let blocks = parse_bytes(&docx).unwrap();
    let Block::Paragraph(p) = &blocks[0] else {
        panic!("expected a paragraph")
    };
    assert!(matches!(&p.items[0], ContentItem::TextRun { text, .. } if text == "Figure:"));
    let ContentItem::Image(image) = &p.items[1] else {
        panic!("expected an image")
    };
    assert_eq!(image.media_type, "image/png");
    assert!(image.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn unresolvable_images_are_dropped_without_failing() {
    let body = paragraph(&format!(
        "{}{}{}",
        text_run("kept"),
        drawing_run("rIdMissing"),
        drawing_run("rIdRemote"),
    ));
    let docx = DocxBuilder::new()
        .body(&body)
        .external_image("rIdRemote", "https://example.com/logo.png")
        .build();
    let blocks = parse_bytes(&docx).unwrap();
    let Block::Paragraph(p) = &blocks[0] else {
        panic!("expected a paragraph")
    };
    assert_eq!(p.items.len(), 1);
    assert_eq!(p.text(), "kept");
}

#[test]
fn nested_tables_are_skipped_but_siblings_kept() {
    let inner = format!(
        "<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
        paragraph(&text_run("inner"))
    );
    let outer = format!(
        "<w:tbl><w:tr><w:tc>{}{}{}</w:tc></w:tr></w:tbl>",
        paragraph(&text_run("before")),
        inner,
        paragraph(&text_run("after")),
    );
    let blocks = parse_bytes(&DocxBuilder::new().body(&outer).build()).unwrap();
    let Block::Table(table) = &blocks[0] else {
        panic!("expected a table")
    };
    let texts: Vec<String> = table.rows[0].cells[0]
        .paragraphs
        .iter()
        .map(|p| p.text())
        .collect();
    assert_eq!(texts, ["before", "after"]);
}

#[test]
fn legacy_doc_is_unsupported() {
    let mut ole = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    ole.extend_from_slice(&[0; 512]);
    assert!(matches!(parse_bytes(&ole), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn broken_packages_are_parse_errors() {
    assert!(matches!(
        parse_bytes(b"definitely not a zip"),
        Err(Error::DocumentParse(_))
    ));

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    std::io::Write::write_all(&mut zip, b"hello").unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    let err = parse_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Error::DocumentParse(_)), "{err}");
    assert!(err.is_client_error());
}

/// A document source with no XML behind it at all.
struct Outline {
    nodes: Vec<Node>,
    body: Vec<usize>,
}

enum Node {
    Paragraph(Vec<usize>),
    Run(&'static str, MapProps, Vec<&'static str>),
    Table(Vec<usize>),
    Row(Vec<usize>),
    Cell(Vec<usize>),
    Bookmark,
}

impl DocumentSource for Outline {
    type Element<'a> = usize;
    type Properties<'a> = MapProps;

    fn iterate_body_blocks<'a>(&'a self) -> Vec<usize> {
        self.body.clone()
    }

    fn kind<'a>(&'a self, element: usize) -> ElementKind {
        match &self.nodes[element] {
            Node::Paragraph(_) => ElementKind::Paragraph,
            Node::Table(_) => ElementKind::Table,
            _ => ElementKind::Other("bookmarkStart".into()),
        }
    }

    fn paragraph_properties<'a>(&'a self, _: usize) -> MapProps {
        MapProps::new().with("jc", &[("val", "right")])
    }

    fn iterate_runs<'a>(&'a self, paragraph: usize) -> Vec<usize> {
        match &self.nodes[paragraph] {
            Node::Paragraph(runs) => runs.clone(),
            _ => Vec::new(),
        }
    }

    fn run_properties<'a>(&'a self, run: usize) -> MapProps {
        match &self.nodes[run] {
            Node::Run(_, props, _) => props.clone(),
            _ => MapProps::new(),
        }
    }

    fn run_text<'a>(&'a self, run: usize) -> String {
        match &self.nodes[run] {
            Node::Run(text, _, _) => text.to_string(),
            _ => String::new(),
        }
    }

    fn run_media_refs<'a>(&'a self, run: usize) -> Vec<&'a str> {
        match &self.nodes[run] {
            Node::Run(_, _, refs) => refs.clone(),
            _ => Vec::new(),
        }
    }

    fn iterate_rows<'a>(&'a self, table: usize) -> Vec<usize> {
        match &self.nodes[table] {
            Node::Table(rows) => rows.clone(),
            _ => Vec::new(),
        }
    }

    fn iterate_cells<'a>(&'a self, row: usize) -> Vec<usize> {
        match &self.nodes[row] {
            Node::Row(cells) => cells.clone(),
            _ => Vec::new(),
        }
    }

    fn iterate_cell_blocks<'a>(&'a self, cell: usize) -> Vec<usize> {
        match &self.nodes[cell] {
            Node::Cell(blocks) => blocks.clone(),
            _ => Vec::new(),
        }
    }

    fn resolve_media(&self, ref_id: &str) -> Option<Image> {
        (ref_id == "logo").then(|| Image {
            bytes: vec![1, 2, 3],
            media_type: "image/png".into(),
        })
    }
}

#[test]
fn walker_is_independent_of_the_xml_library() {
    let source = Outline {
        nodes: vec![
            Node::Run("Title", MapProps::new().with("i", &[]), vec!["logo", "ghost"]),
            Node::Paragraph(vec![0]),
            Node::Bookmark,
            Node::Run("", MapProps::new(), vec![]),
            Node::Paragraph(vec![3]),
            Node::Cell(vec![4, 2]),
            Node::Row(vec![5]),
            Node::Table(vec![6]),
        ],
        body: vec![1, 2, 7],
    };

    let blocks = walk(&source);
    assert_eq!(blocks.len(), 2, "the bookmark is skipped");

    let Block::Paragraph(p) = &blocks[0] else {
        panic!("expected a paragraph")
    };
    assert_eq!(p.style.alignment, Some(coverdoc::Alignment::Right));
    assert_eq!(p.items.len(), 2, "unresolved image is dropped");
    assert!(matches!(&p.items[0], ContentItem::TextRun { style, .. } if style.italic));
    assert!(matches!(&p.items[1], ContentItem::Image(img) if img.bytes == [1, 2, 3]));

    let Block::Table(table) = &blocks[1] else {
        panic!("expected a table")
    };
    let cell = &table.rows[0].cells[0];
    assert_eq!(cell.paragraphs.len(), 1);
    assert!(cell.is_blank());
}
