//! Assignment cover page, drawn directly onto a single PDF page.

use pdf_writer::{Content, Name, Str};

use crate::Options;
use crate::assets;
use crate::error::Error;
use crate::fonts::{Family, FontFace, to_winansi_bytes};
use crate::model::PaginatedDocument;
use crate::pdf::writer::DocumentWriter;

const INSTITUTION: &str = "PREMIER UNIVERSITY";
const DEPARTMENT: &str = "Department of Computer Science & Engineering";
const PROGRAM: &str = "B.Sc. in CSE";
const BATCH: &str = "41";
const SECTION: &str = "C";
const SESSION: &str = "Fall 2025";
const AFFILIATION: [&str; 3] = ["Lecturer, CSE Department", "Premier University", "Chittagong"];

const MARGIN: f32 = 50.0;
const LOGO_SIZE: f32 = 70.0;
const ROW_HEIGHT: f32 = 25.0;
const LABEL_CELL: f32 = 80.0;
const TABLE_WIDTH: f32 = 380.0;
const TABLE_GAP: f32 = 30.0;
const REMARKS_WIDTH: f32 = 150.0;
const REMARKS_HEIGHT: f32 = 120.0;

const ROMAN: FontFace = FontFace::new(Family::Times, false, false);
const BOLD: FontFace = FontFace::new(Family::Times, true, false);
const ITALIC: FontFace = FontFace::new(Family::Times, false, true);

/// Values printed on the cover. Empty strings fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverFields {
    pub assignment_no: String,
    pub course_code: String,
    pub course_title: String,
    pub assignment_name: String,
    pub submission_date: String,
    pub student_name: String,
    pub student_id: String,
    pub submitted_to: String,
}

impl Default for CoverFields {
    fn default() -> Self {
        Self {
            assignment_no: "01".into(),
            course_code: "MGT 251".into(),
            course_title: "Organizational Behavior".into(),
            assignment_name: "Regular Assignment".into(),
            submission_date: "29-06-2025".into(),
            student_name: "Mohammad Hafizur Rahman Sakib".into(),
            student_id: "0222210005101118".into(),
            submitted_to: "Tashin Hossain".into(),
        }
    }
}

impl CoverFields {
    /// Copy of `self` with every blank field replaced by its default.
    pub fn resolved(&self) -> CoverFields {
        let defaults = CoverFields::default();
        let pick = |value: &String, default: String| {
            if value.trim().is_empty() {
                default
            } else {
                value.trim().to_string()
            }
        };
        CoverFields {
            assignment_no: pick(&self.assignment_no, defaults.assignment_no),
            course_code: pick(&self.course_code, defaults.course_code),
            course_title: pick(&self.course_title, defaults.course_title),
            assignment_name: pick(&self.assignment_name, defaults.assignment_name),
            submission_date: pick(&self.submission_date, defaults.submission_date),
            student_name: pick(&self.student_name, defaults.student_name),
            student_id: pick(&self.student_id, defaults.student_id),
            submitted_to: pick(&self.submitted_to, defaults.submitted_to),
        }
    }
}

struct Canvas<'w> {
    content: Content,
    writer: &'w mut DocumentWriter,
}

impl Canvas<'_> {
    fn text(&mut self, face: FontFace, size: f32, x: f32, y: f32, text: &str) {
        let font = self.writer.font(face);
        self.content
            .begin_text()
            .set_font(Name(font.as_bytes()), size)
            .next_line(x, y)
            .show(Str(&to_winansi_bytes(text)))
            .end_text();
    }

    fn line(&mut self, width: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.content
            .set_line_width(width)
            .move_to(x1, y1)
            .line_to(x2, y2)
            .stroke();
    }

    fn rect(&mut self, width: f32, x: f32, y: f32, w: f32, h: f32) {
        self.content.set_line_width(width).rect(x, y, w, h).stroke();
    }

    /// Bold heading with a 1pt underline 5pt below the baseline.
    fn heading(&mut self, x: f32, y: f32, text: &str) {
        self.text(BOLD, 16.0, x, y, text);
        let w = BOLD.text_width(text, 16.0);
        self.line(1.0, x, y - 5.0, x + w, y - 5.0);
    }
}

/// Render the one-page cover. The page size comes from `options`; positions
/// are measured from the page edges so A4 keeps the same arrangement.
pub fn render_cover(fields: &CoverFields, options: &Options) -> Result<PaginatedDocument, Error> {
    let fields = fields.resolved();
    let mut writer = DocumentWriter::new(options.page_size);
    let (width, height) = (writer.page_width(), writer.page_height());

    let logo = options.logo_path.as_deref().and_then(|path| {
        let bytes = assets::logo(path)?;
        let placed = writer.embed_image(bytes);
        if placed.is_none() {
            log::warn!("Error drawing image: logo at {} is not a PNG or JPEG", path.display());
        }
        placed
    });

    let mut canvas = Canvas {
        content: Content::new(),
        writer: &mut writer,
    };
    let left = MARGIN + 40.0;

    canvas.rect(2.0, MARGIN, MARGIN, width - 2.0 * MARGIN, height - 2.0 * MARGIN);

    // Header: institution left, logo centered, department right.
    let mut y = height - 120.0;
    canvas.text(ROMAN, 23.0, left, y, INSTITUTION);
    if let Some(logo) = &logo {
        canvas.content.save_state();
        canvas.content.transform([
            LOGO_SIZE,
            0.0,
            0.0,
            LOGO_SIZE,
            width / 2.0 - LOGO_SIZE / 2.0,
            y - 10.0,
        ]);
        canvas.content.x_object(Name(logo.name.as_bytes()));
        canvas.content.restore_state();
    }
    let dept_w = ITALIC.text_width(DEPARTMENT, 16.0);
    canvas.text(ITALIC, 16.0, width - MARGIN - dept_w - 40.0, y, DEPARTMENT);

    y -= 80.0;
    canvas.content.set_dash_pattern([2.0, 2.0], 0.0);
    canvas.line(2.0, MARGIN + 20.0, y, width - MARGIN - 20.0, y);
    canvas.content.set_dash_pattern([], 0.0);

    y -= 60.0;
    let title = "Assignment";
    let title_w = BOLD.text_width(title, 23.0);
    canvas.text(BOLD, 23.0, width / 2.0 - title_w / 2.0, y, title);
    canvas.line(1.0, width / 2.0 - title_w / 2.0, y - 5.0, width / 2.0 + title_w / 2.0, y - 5.0);

    y -= 50.0;
    let info = [
        ("Assignment No.", &fields.assignment_no),
        ("Course Code", &fields.course_code),
        ("Course Title", &fields.course_title),
        ("Assignment Name", &fields.assignment_name),
        ("Date of Submission", &fields.submission_date),
    ];
    for (label, value) in info {
        canvas.text(ROMAN, 16.0, left, y, label);
        canvas.text(ROMAN, 16.0, MARGIN + 200.0, y, ":");
        canvas.text(BOLD, 16.0, MARGIN + 220.0, y, value);
        y -= 25.0;
    }

    y -= 30.0;
    canvas.heading(left, y, "Submitted by");

    // Student table with the remarks box to its right. On pages too narrow for
    // both, the table gives up width so the box stays inside the border.
    y -= 40.0;
    let table_top = y;
    let room = width - MARGIN - 10.0 - left - TABLE_GAP - REMARKS_WIDTH;
    let table_w = TABLE_WIDTH.min(room).max(LABEL_CELL * 2.0);
    let student = [
        ("Name", fields.student_name.as_str()),
        ("ID", fields.student_id.as_str()),
        ("Program", PROGRAM),
        ("Batch", BATCH),
        ("Section", SECTION),
        ("Session", SESSION),
    ];
    for (i, (label, value)) in student.iter().enumerate() {
        let row_bottom = table_top - (i as f32 + 1.0) * ROW_HEIGHT;
        canvas.rect(1.0, left, row_bottom, LABEL_CELL, ROW_HEIGHT);
        canvas.rect(1.0, left + LABEL_CELL, row_bottom, table_w - LABEL_CELL, ROW_HEIGHT);
        canvas.text(ROMAN, 14.0, left + 5.0, row_bottom + 8.0, label);
        canvas.text(ROMAN, 14.0, left + LABEL_CELL + 5.0, row_bottom + 8.0, value);
    }

    let remarks_x = left + table_w + TABLE_GAP;
    canvas.rect(2.0, remarks_x, table_top - REMARKS_HEIGHT, REMARKS_WIDTH, REMARKS_HEIGHT);
    let remarks_w = BOLD.text_width("Remarks", 14.0);
    canvas.text(
        BOLD,
        14.0,
        remarks_x + REMARKS_WIDTH / 2.0 - remarks_w / 2.0,
        table_top - 20.0,
        "Remarks",
    );
    canvas.line(
        1.0,
        remarks_x + 5.0,
        table_top - 30.0,
        remarks_x + REMARKS_WIDTH - 5.0,
        table_top - 30.0,
    );

    y = table_top - student.len() as f32 * ROW_HEIGHT - 80.0;
    canvas.heading(left, y, "Submitted to");
    y -= 30.0;
    canvas.text(BOLD, 14.0, left, y, "Submitted to:");
    y -= 20.0;
    for line in std::iter::once(fields.submitted_to.as_str()).chain(AFFILIATION) {
        canvas.text(ROMAN, 14.0, left, y, line);
        y -= 18.0;
    }

    let content = canvas.content;
    let doc = writer.finish(vec![content]);
    log::debug!("Cover page rendered ({} bytes)", doc.bytes.len());
    Ok(doc)
}
