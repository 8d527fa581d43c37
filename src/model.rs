#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Normalized formatting of one run. `None` fields mean "inherit the renderer default".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size_pt: Option<f32>,
    pub font_family: Option<String>,
    /// Lowercase 6-digit hex, never `000000`.
    pub color_hex: Option<String>,
}

impl RunStyle {
    pub fn is_plain(&self) -> bool {
        *self == RunStyle::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParagraphStyle {
    pub alignment: Option<Alignment>,
    pub margin_top_pt: Option<f32>,
    pub margin_bottom_pt: Option<f32>,
}

impl ParagraphStyle {
    pub fn is_empty(&self) -> bool {
        *self == ParagraphStyle::default()
    }
}

/// Raster (or other) media pulled out of the package, with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl Image {
    pub fn is_raster(&self) -> bool {
        matches!(
            self.media_type.as_str(),
            "image/png" | "image/jpeg" | "image/gif" | "image/bmp" | "image/webp"
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContentItem {
    TextRun { text: String, style: RunStyle },
    Image(Image),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub items: Vec<ContentItem>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// True when the paragraph has no raster image and no non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.items.iter().all(|item| match item {
            ContentItem::TextRun { text, .. } => text.trim().is_empty(),
            ContentItem::Image(image) => !image.is_raster(),
        })
    }

    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                ContentItem::TextRun { text, .. } => Some(text.as_str()),
                ContentItem::Image(_) => None,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn is_blank(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_blank)
    }
}

/// One physical row. Rows need not have the same number of cells; merged
/// cells are emitted as they appear in the source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

/// A finished fixed-layout document: encoded bytes plus the number of pages they hold.
#[derive(Clone, Debug)]
pub struct PaginatedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageSize {
    Letter,
    A4,
}

impl PageSize {
    /// (width, height) in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}
