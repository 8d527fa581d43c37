#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const DOCUMENT_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:v="urn:schemas-microsoft-com:vml" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#,
);

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// In-memory DOCX package with a hand-written body.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    media: Vec<(String, String, Vec<u8>)>,
    external: Vec<(String, String)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body XML (`<w:p>`, `<w:tbl>`, ...).
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Add an image part at `word/media/{file_name}` reachable through `rel_id`.
    pub fn image(mut self, rel_id: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        self.media
            .push((rel_id.to_string(), file_name.to_string(), bytes));
        self
    }

    pub fn external_image(mut self, rel_id: &str, url: &str) -> Self {
        self.external.push((rel_id.to_string(), url.to_string()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
                r#"<Default Extension="xml" ContentType="application/xml"/>"#,
                r#"<Default Extension="png" ContentType="image/png"/>"#,
                r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
                r#"<Default Extension="gif" ContentType="image/gif"/>"#,
                r#"<Default Extension="emf" ContentType="image/x-emf"/>"#,
                r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
                r#"</Types>"#,
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
                r#"</Relationships>"#,
            )
            .as_bytes(),
        )
        .unwrap();

        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (rel_id, file_name, _) in &self.media {
            rels.push_str(&format!(
                r#"<Relationship Id="{rel_id}" Type="{IMAGE_REL_TYPE}" Target="media/{file_name}"/>"#
            ));
        }
        for (rel_id, url) in &self.external {
            rels.push_str(&format!(
                r#"<Relationship Id="{rel_id}" Type="{IMAGE_REL_TYPE}" Target="{url}" TargetMode="External"/>"#
            ));
        }
        rels.push_str("</Relationships>");
        zip.start_file("word/_rels/document.xml.rels", options)
            .unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {DOCUMENT_NAMESPACES}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                self.body
            )
            .as_bytes(),
        )
        .unwrap();

        for (_, file_name, bytes) in &self.media {
            zip.start_file(format!("word/media/{file_name}"), options)
                .unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

pub fn text_run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn paragraph(inner: &str) -> String {
    format!("<w:p>{inner}</w:p>")
}

/// A run holding one inline DrawingML picture.
pub fn drawing_run(rel_id: &str) -> String {
    format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline><wp:extent cx="952500" cy="952500"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        rel_id
    )
}

/// Solid-colour PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Solid-colour GIF of the given size.
pub fn gif(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Gif).unwrap();
    out.into_inner()
}

/// Number of image XObject streams in the file, soft masks included.
pub fn image_xobject_count(pdf: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(pdf).expect("output is a readable PDF");
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(lopdf::Object::as_name)
                .is_ok_and(|name| name == b"Image")
        })
        .count()
}

/// A DOCX with `count` paragraphs of filler text.
pub fn long_document(count: usize) -> Vec<u8> {
    let filler = "The quick brown fox jumps over the lazy dog. ".repeat(12);
    let mut builder = DocxBuilder::new();
    for i in 0..count {
        builder = builder.body(&paragraph(&text_run(&format!("{i}. {filler}"))));
    }
    builder.build()
}

pub fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf)
        .expect("output is a readable PDF")
        .get_pages()
        .len()
}

/// (width, height) of every page's MediaBox, in page order.
pub fn page_sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(pdf).expect("output is a readable PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(lopdf::Object::as_array)
                .expect("page has its own MediaBox");
            let n: Vec<f32> = media_box
                .iter()
                .map(|o| match o {
                    lopdf::Object::Integer(i) => *i as f32,
                    lopdf::Object::Real(r) => *r as f32,
                    other => panic!("unexpected MediaBox entry {other:?}"),
                })
                .collect();
            (n[2] - n[0], n[3] - n[1])
        })
        .collect()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Property set backed by a plain map, standing in for any XML library.
#[derive(Clone, Debug, Default)]
pub struct MapProps(Vec<(&'static str, Vec<(&'static str, &'static str)>)>);

impl MapProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, attrs: &[(&'static str, &'static str)]) -> Self {
        self.0.push((name, attrs.to_vec()));
        self
    }
}

impl coverdoc::PropertySet for MapProps {
    fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| *n == name)
    }

    fn value(&self, name: &str, attr: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| *n == name)?
            .1
            .iter()
            .find(|(a, _)| *a == attr)
            .map(|(_, v)| *v)
    }
}
