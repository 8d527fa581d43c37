mod assemble;
mod assets;
mod cover;
pub mod docx;
mod error;
mod fonts;
pub mod html;
mod model;
mod pdf;

pub use assemble::merge;
pub use assets::logo;
pub use cover::{CoverFields, render_cover};
pub use docx::formatting::{PropertySet, paragraph_style, run_style};
pub use docx::source::{DocumentSource, ElementKind};
pub use docx::walker::walk;
pub use error::Error;
pub use model::{
    Alignment, Block, ContentItem, Image, PageSize, PaginatedDocument, Paragraph,
    ParagraphStyle, RunStyle, Table, TableCell, TableRow,
};
pub use pdf::{FixedLayoutRenderer, PdfRenderer};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

pub const COVER_ONLY_FILENAME: &str = "assignment_cover_page.pdf";
pub const WITH_COVER_FILENAME: &str = "assignment_with_cover.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Settings shared by every stage of a request.
#[derive(Clone, Debug)]
pub struct Options {
    pub page_size: PageSize,
    /// Margin on all four sides of body pages, in points.
    pub margin_pt: f32,
    pub render_timeout: Duration,
    pub logo_path: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            margin_pt: 72.0,
            render_timeout: Duration::from_secs(60),
            logo_path: None,
        }
    }
}

impl Options {
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margin(mut self, margin_pt: f32) -> Self {
        self.margin_pt = margin_pt;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }
}

/// A document uploaded alongside the cover fields.
#[derive(Clone, Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct SubmissionRequest {
    pub fields: CoverFields,
    pub upload: Option<Upload>,
}

/// Finished output with the name and MIME type to hand back to the client.
#[derive(Clone, Debug)]
pub struct Submission {
    pub bytes: Vec<u8>,
    pub filename: &'static str,
    pub content_type: &'static str,
}

/// Walk a DOCX upload and serialize it as standalone HTML.
pub fn convert_docx_to_html(bytes: &[u8]) -> Result<String, Error> {
    let blocks = docx::parse_bytes(bytes)?;
    Ok(html::render_document(&blocks))
}

/// Convert a DOCX upload to PDF with the built-in renderer, without a cover.
pub fn convert_docx_to_pdf(bytes: &[u8], options: &Options) -> Result<PaginatedDocument, Error> {
    let markup = convert_docx_to_html(bytes)?;
    render_with_timeout(
        Arc::new(PdfRenderer::from_options(options)),
        markup,
        options.render_timeout,
    )
}

/// Run `renderer` on a worker thread and wait at most `timeout` for it.
///
/// On timeout the worker is left to finish on its own and its result is dropped.
pub fn render_with_timeout(
    renderer: Arc<dyn FixedLayoutRenderer>,
    markup: String,
    timeout: Duration,
) -> Result<PaginatedDocument, Error> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("coverdoc-render".into())
        .spawn(move || {
            // The receiver is gone if the caller already timed out.
            let _ = tx.send(renderer.render(&markup));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!(
                "Renderer did not finish within {:.1}s, abandoning request",
                timeout.as_secs_f64()
            );
            Err(Error::Timeout(timeout))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::Render(
            "renderer stopped without producing a document".into(),
        )),
    }
}

fn check_extension(filename: &str) -> Result<(), Error> {
    let ext = Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("docx") => Ok(()),
        Some("doc") => Err(Error::UnsupportedFormat(format!(
            "{filename} is a legacy Word 97-2003 (.doc) file"
        ))),
        _ => Err(Error::UnsupportedFormat(format!(
            "{filename} is not a Word (.docx) document"
        ))),
    }
}

/// Build the cover page and, when a document was uploaded, append it after the cover.
pub fn build_submission(request: &SubmissionRequest, options: &Options) -> Result<Submission, Error> {
    build_submission_with(request, options, Arc::new(PdfRenderer::from_options(options)))
}

/// [`build_submission`] with a caller-supplied body renderer.
pub fn build_submission_with(
    request: &SubmissionRequest,
    options: &Options,
    renderer: Arc<dyn FixedLayoutRenderer>,
) -> Result<Submission, Error> {
    let t0 = Instant::now();

    let Some(upload) = &request.upload else {
        let cover = render_cover(&request.fields, options)?;
        log::info!(
            "Timing: cover={:.1}ms (output {} bytes)",
            t0.elapsed().as_secs_f64() * 1000.0,
            cover.bytes.len(),
        );
        return Ok(Submission {
            bytes: cover.bytes,
            filename: COVER_ONLY_FILENAME,
            content_type: PDF_CONTENT_TYPE,
        });
    };

    check_extension(&upload.filename)?;

    let blocks = docx::parse_bytes(&upload.bytes)?;
    let t_parse = t0.elapsed();

    let markup = html::render_document(&blocks);
    drop(blocks);
    let t_html = t0.elapsed();

    let body = render_with_timeout(renderer, markup, options.render_timeout)?;
    let t_render = t0.elapsed();

    let cover = render_cover(&request.fields, options)?;
    let merged = merge(&[cover, body])?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, html={:.1}ms, render={:.1}ms, merge={:.1}ms, total={:.1}ms (output {} bytes, {} pages)",
        t_parse.as_secs_f64() * 1000.0,
        (t_html - t_parse).as_secs_f64() * 1000.0,
        (t_render - t_html).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        merged.bytes.len(),
        merged.page_count,
    );

    Ok(Submission {
        bytes: merged.bytes,
        filename: WITH_COVER_FILENAME,
        content_type: PDF_CONTENT_TYPE,
    })
}
