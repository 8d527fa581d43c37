pub mod formatting;
pub mod source;
pub mod walker;

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::time::Instant;

use crate::error::Error;
use crate::model::{Block, Image};

use formatting::PropertySet;
use source::{DocumentSource, ElementKind};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const VML_NS: &str = "urn:schemas-microsoft-com:vml";
const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const IMAGE_REL: &str = "/image";
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

type Archive<'b> = zip::ZipArchive<Cursor<&'b [u8]>>;

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

impl PropertySet for roxmltree::Node<'_, '_> {
    fn has(&self, name: &str) -> bool {
        wml(*self, name).is_some()
    }

    fn value(&self, name: &str, attr: &str) -> Option<&str> {
        wml(*self, name).and_then(|n| n.attribute((WML_NS, attr)))
    }
}

/// Convert a package into blocks, releasing the archive before returning.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<Block>, Error> {
    let t0 = Instant::now();
    let package = DocxPackage::from_bytes(bytes)?;
    let t_open = t0.elapsed();

    let body = package.body()?;
    let blocks = walker::walk(&body);

    log::info!(
        "Parsed DOCX: {} blocks ({} tables), open={:.1}ms, walk={:.1}ms",
        blocks.len(),
        blocks.iter().filter(|b| b.is_table()).count(),
        t_open.as_secs_f64() * 1000.0,
        (t0.elapsed() - t_open).as_secs_f64() * 1000.0,
    );
    Ok(blocks)
}

struct Relationship {
    target: String,
    rel_type: String,
    external: bool,
}

#[derive(Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn lookup(&self, part_path: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(&format!("/{part_path}")) {
            return Some(ct);
        }
        let ext = part_path.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults.get(&ext).map(String::as_str)
    }
}

/// The parts of a DOCX package the content walker needs, copied out of the
/// archive so the archive itself is closed once this is built.
pub struct DocxPackage {
    document_xml: String,
    relationships: HashMap<String, Relationship>,
    content_types: ContentTypes,
    media: HashMap<String, Vec<u8>>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.starts_with(&OLE_SIGNATURE) {
            return Err(Error::UnsupportedFormat(
                "legacy binary Word (.doc) files are not supported".into(),
            ));
        }
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let main_part = main_document_path(&mut zip);
        let document_xml = read_zip_text(&mut zip, &main_part).ok_or_else(|| {
            Error::DocumentParse(format!("missing {main_part} (is this a DOCX file?)"))
        })?;

        let content_types = read_zip_text(&mut zip, "[Content_Types].xml")
            .map(|xml| parse_content_types(&xml))
            .unwrap_or_default();

        let base_dir = main_part.rsplit_once('/').map_or("", |(dir, _)| dir);
        let relationships = parse_part_relationships(&mut zip, &main_part);

        let mut media = HashMap::new();
        for rel in relationships.values() {
            if rel.external || !rel.rel_type.ends_with(IMAGE_REL) {
                continue;
            }
            let path = resolve_part_path(base_dir, &rel.target);
            if media.contains_key(&path) {
                continue;
            }
            match read_zip_bytes(&mut zip, &path) {
                Some(data) => {
                    media.insert(path, data);
                }
                None => log::warn!("Image part {path} is missing or unreadable"),
            }
        }

        Ok(Self {
            document_xml,
            relationships: relationships
                .into_iter()
                .map(|(id, rel)| {
                    let target = if rel.external {
                        rel.target
                    } else {
                        resolve_part_path(base_dir, &rel.target)
                    };
                    (id, Relationship { target, ..rel })
                })
                .collect(),
            content_types,
            media,
        })
    }

    /// Parse the main document part. Fails when the XML is malformed or has no `w:body`.
    pub fn body(&self) -> Result<DocxBody<'_>, Error> {
        let xml = roxmltree::Document::parse(&self.document_xml)?;
        if wml(xml.root_element(), "body").is_none() {
            return Err(Error::DocumentParse("document has no w:body element".into()));
        }
        Ok(DocxBody {
            xml,
            package: self,
        })
    }
}

pub struct DocxBody<'p> {
    xml: roxmltree::Document<'p>,
    package: &'p DocxPackage,
}

impl DocumentSource for DocxBody<'_> {
    type Element<'a>
        = roxmltree::Node<'a, 'a>
    where
        Self: 'a;
    type Properties<'a>
        = Option<roxmltree::Node<'a, 'a>>
    where
        Self: 'a;

    fn iterate_body_blocks<'a>(&'a self) -> Vec<Self::Element<'a>> {
        wml(self.xml.root_element(), "body")
            .map(collect_block_nodes)
            .unwrap_or_default()
    }

    fn kind<'a>(&'a self, element: Self::Element<'a>) -> ElementKind {
        let tag = element.tag_name();
        match (tag.namespace(), tag.name()) {
            (Some(WML_NS), "p") => ElementKind::Paragraph,
            (Some(WML_NS), "tbl") => ElementKind::Table,
            (_, name) => ElementKind::Other(name.to_string()),
        }
    }

    fn paragraph_properties<'a>(&'a self, paragraph: Self::Element<'a>) -> Self::Properties<'a> {
        wml(paragraph, "pPr")
    }

    fn iterate_runs<'a>(&'a self, paragraph: Self::Element<'a>) -> Vec<Self::Element<'a>> {
        fn collect_run_nodes<'a>(
            parent: roxmltree::Node<'a, 'a>,
            out: &mut Vec<roxmltree::Node<'a, 'a>>,
        ) {
            for child in parent.children() {
                if child.tag_name().namespace() != Some(WML_NS) {
                    continue;
                }
                match child.tag_name().name() {
                    "r" => out.push(child),
                    "hyperlink" | "smartTag" | "fldSimple" => collect_run_nodes(child, out),
                    "sdt" => {
                        if let Some(content) = wml(child, "sdtContent") {
                            collect_run_nodes(content, out);
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut runs = Vec::new();
        collect_run_nodes(paragraph, &mut runs);
        runs
    }

    fn run_properties<'a>(&'a self, run: Self::Element<'a>) -> Self::Properties<'a> {
        wml(run, "rPr")
    }

    fn run_text<'a>(&'a self, run: Self::Element<'a>) -> String {
        let mut text = String::new();
        for child in run.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                "t" => text.push_str(child.text().unwrap_or("")),
                "tab" => text.push('\t'),
                "br" | "cr" => text.push('\n'),
                "noBreakHyphen" => text.push('\u{2011}'),
                _ => {}
            }
        }
        text
    }

    fn run_media_refs<'a>(&'a self, run: Self::Element<'a>) -> Vec<&'a str> {
        run.descendants()
            .filter(|n| !in_compat_fallback(*n))
            .filter_map(|n| {
                let tag = n.tag_name();
                match (tag.namespace(), tag.name()) {
                    (Some(DML_NS), "blip") => n.attribute((REL_NS, "embed")),
                    (Some(VML_NS), "imagedata") => n.attribute((REL_NS, "id")),
                    _ => None,
                }
            })
            .collect()
    }

    fn iterate_rows<'a>(&'a self, table: Self::Element<'a>) -> Vec<Self::Element<'a>> {
        collect_block_nodes(table)
            .into_iter()
            .filter(|n| is_wml(*n, "tr"))
            .collect()
    }

    fn iterate_cells<'a>(&'a self, row: Self::Element<'a>) -> Vec<Self::Element<'a>> {
        collect_block_nodes(row)
            .into_iter()
            .filter(|n| is_wml(*n, "tc"))
            .collect()
    }

    fn iterate_cell_blocks<'a>(&'a self, cell: Self::Element<'a>) -> Vec<Self::Element<'a>> {
        collect_block_nodes(cell)
    }

    fn resolve_media(&self, ref_id: &str) -> Option<Image> {
        let rel = self.package.relationships.get(ref_id)?;
        if rel.external {
            log::debug!("Image {ref_id} is linked externally ({})", rel.target);
            return None;
        }
        let bytes = self.package.media.get(&rel.target)?.clone();
        let media_type = self
            .package
            .content_types
            .lookup(&rel.target)
            .map(str::to_string)
            .unwrap_or_else(|| sniff_media_type(&bytes).to_string());
        Some(Image { bytes, media_type })
    }
}

/// Element children, with block-level `w:sdt` wrappers flattened into their content.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children().filter(|n| n.is_element()) {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

/// `mc:Fallback` duplicates the `mc:Choice` content (VML copy of a DrawingML picture).
fn in_compat_fallback(node: roxmltree::Node) -> bool {
    node.ancestors()
        .any(|a| a.tag_name().name() == "Fallback" && a.tag_name().namespace() == Some(MC_NS))
}

fn read_zip_text(zip: &mut Archive, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn read_zip_bytes(zip: &mut Archive, name: &str) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    zip.by_name(name).ok()?.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Main part named by the package relationships, `word/document.xml` when absent.
fn main_document_path(zip: &mut Archive) -> String {
    read_zip_text(zip, "_rels/.rels")
        .map(|xml| parse_rels_xml(&xml))
        .and_then(|rels| {
            rels.into_values()
                .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL) && !rel.external)
                .map(|rel| resolve_part_path("", &rel.target))
        })
        .unwrap_or_else(|| "word/document.xml".to_string())
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, Relationship> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(
                id.to_string(),
                Relationship {
                    target: target.to_string(),
                    rel_type: node.attribute("Type").unwrap_or("").to_string(),
                    external: node.attribute("TargetMode") == Some("External"),
                },
            );
        }
    }
    rels
}

/// Load relationships for a part like "word/document.xml" → "word/_rels/document.xml.rels"
fn parse_part_relationships(zip: &mut Archive, part_path: &str) -> HashMap<String, Relationship> {
    let (dir, file) = match part_path.rsplit_once('/') {
        Some((d, f)) => (d, f),
        None => ("", part_path),
    };
    let rels_path = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };
    let Some(xml_content) = read_zip_text(zip, &rels_path) else {
        return HashMap::new();
    };
    parse_rels_xml(&xml_content)
}

fn parse_content_types(xml_content: &str) -> ContentTypes {
    let mut types = ContentTypes::default();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return types;
    };
    for node in xml.root_element().children() {
        match node.tag_name().name() {
            "Default" => {
                if let (Some(ext), Some(ct)) =
                    (node.attribute("Extension"), node.attribute("ContentType"))
                {
                    types
                        .defaults
                        .insert(ext.to_ascii_lowercase(), ct.to_string());
                }
            }
            "Override" => {
                if let (Some(part), Some(ct)) =
                    (node.attribute("PartName"), node.attribute("ContentType"))
                {
                    types.overrides.insert(part.to_string(), ct.to_string());
                }
            }
            _ => {}
        }
    }
    types
}

/// Resolve a relationship target against the directory of its source part.
/// Absolute targets ("/word/media/x.png") are package-rooted.
fn resolve_part_path(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => base_dir.split('/').filter(|s| !s.is_empty()).collect(),
    };
    for segment in target.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn sniff_media_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        "application/octet-stream"
    }
}
