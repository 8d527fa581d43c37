use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::fonts::FontFace;
use crate::model::{PageSize, PaginatedDocument};

use super::image::{raster_info, write_image_xobject};

/// An image XObject registered with the writer, with its natural size in points.
#[derive(Clone, Debug)]
pub(crate) struct PlacedImage {
    pub(crate) name: String,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

/// Owns the PDF under construction: object ids, fonts and images shared by all pages.
pub(crate) struct DocumentWriter {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    fonts: Vec<(FontFace, String, Ref)>,
    images: Vec<(String, Ref)>,
    page_width: f32,
    page_height: f32,
}

impl DocumentWriter {
    pub(crate) fn new(page_size: PageSize) -> Self {
        let (page_width, page_height) = page_size.dimensions();
        Self {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            fonts: Vec::new(),
            images: Vec::new(),
            page_width,
            page_height,
        }
    }

    pub(crate) fn page_width(&self) -> f32 {
        self.page_width
    }

    pub(crate) fn page_height(&self) -> f32 {
        self.page_height
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    /// Resource name for `face`, writing the Type1 font object on first use.
    pub(crate) fn font(&mut self, face: FontFace) -> String {
        if let Some((_, name, _)) = self.fonts.iter().find(|(f, _, _)| *f == face) {
            return name.clone();
        }
        let font_ref = self.alloc();
        let name = format!("F{}", self.fonts.len() + 1);
        self.pdf
            .type1_font(font_ref)
            .base_font(Name(face.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        self.fonts.push((face, name.clone(), font_ref));
        name
    }

    /// Embed a PNG or JPEG. Natural size assumes 96 DPI.
    pub(crate) fn embed_image(&mut self, data: &[u8]) -> Option<PlacedImage> {
        let Some(info) = raster_info(data) else {
            log::warn!("Skipping image: not a PNG or JPEG ({} bytes)", data.len());
            return None;
        };
        if info.pixel_width == 0 || info.pixel_height == 0 {
            return None;
        }
        let xobj_ref = self.alloc();
        let mut next_id = self.next_id;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        let written = write_image_xobject(&mut self.pdf, xobj_ref, data, info, &mut alloc);
        self.next_id = next_id;
        if !written {
            return None;
        }

        let name = format!("Im{}", self.images.len() + 1);
        self.images.push((name.clone(), xobj_ref));
        Some(PlacedImage {
            name,
            width: info.pixel_width as f32 * 0.75,
            height: info.pixel_height as f32 * 0.75,
        })
    }

    /// Write the page tree around `pages` and serialize. An empty list yields one blank page.
    pub(crate) fn finish(mut self, mut pages: Vec<Content>) -> PaginatedDocument {
        if pages.is_empty() {
            pages.push(Content::new());
        }
        let n = pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();

        for (i, c) in pages.into_iter().enumerate() {
            let raw = c.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            self.pdf
                .stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);
        }

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = self.pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(self.pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (_, name, font_ref) in &self.fonts {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !self.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &self.images {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        PaginatedDocument {
            bytes: self.pdf.finish(),
            page_count: n,
        }
    }
}
