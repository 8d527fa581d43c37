//! Concatenate paginated documents into one, preserving page order and each
//! page's own size.

use std::collections::BTreeMap;
use std::time::Instant;

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::Error;
use crate::model::PaginatedDocument;

/// Page attributes a page may inherit from an ancestor `Pages` node. They are
/// copied onto each page, since the input page trees are discarded.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Bounds the walk up a (possibly cyclic) `Parent` chain.
const MAX_TREE_DEPTH: usize = 64;

fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let Some(node_id) = parent else { break };
        if missing.is_empty() {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    found
}

/// Merge `documents` in order: all pages of the first, then all of the second, and so on.
///
/// Every input must parse and contain at least one page, and at least two inputs
/// are required; otherwise the merge fails as a whole and no partial output is produced.
pub fn merge(documents: &[PaginatedDocument]) -> Result<PaginatedDocument, Error> {
    let t0 = Instant::now();
    if documents.len() < 2 {
        return Err(Error::Merge(format!(
            "at least two documents are required, got {}",
            documents.len()
        )));
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (index, input) in documents.iter().enumerate() {
        let mut doc = Document::load_mem(&input.bytes)
            .map_err(|e| Error::Merge(format!("document {index} is not a readable PDF: {e}")))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(Error::Merge(format!("document {index} has no pages")));
        }

        for &page_id in &pages {
            let inherited = inherited_attributes(&doc, page_id);
            if inherited.is_empty() {
                continue;
            }
            if let Ok(page) = doc.get_dictionary_mut(page_id) {
                for (key, value) in inherited {
                    page.set(key, value);
                }
            }
        }

        for (id, object) in doc.objects {
            match object.type_name().ok() {
                Some("Catalog") | Some("Pages") => {}
                _ => {
                    objects.insert(id, object);
                }
            }
        }
        log::debug!("Merge input {index}: {} pages", pages.len());
        page_ids.extend(pages);
    }

    let pages_id: ObjectId = (max_id, 0);
    let catalog_id: ObjectId = (max_id + 1, 0);

    let mut merged = Document::with_version("1.7");
    merged.objects = objects;
    for &page_id in &page_ids {
        if let Ok(page) = merged.get_dictionary_mut(page_id) {
            page.set("Parent", pages_id);
        }
    }
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = catalog_id.0;

    let mut bytes = Vec::new();
    merged
        .save_to(&mut bytes)
        .map_err(|e| Error::Merge(format!("cannot write merged document: {e}")))?;

    log::info!(
        "Merged {} documents into {} pages in {:.1}ms ({} bytes)",
        documents.len(),
        page_ids.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );
    Ok(PaginatedDocument {
        page_count: page_ids.len(),
        bytes,
    })
}
