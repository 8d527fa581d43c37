use crate::model::Image;

use super::formatting::PropertySet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Table,
    /// Anything else (section properties, bookmarks, unknown extensions).
    Other(String),
}

/// Traversal capabilities the content walker needs from a parsed
/// word-processing document. Any OOXML object model can implement this;
/// element handles are cheap copies borrowed from the source.
pub trait DocumentSource {
    type Element<'a>: Copy
    where
        Self: 'a;
    type Properties<'a>: PropertySet
    where
        Self: 'a;

    /// Block-level body elements in document order.
    fn iterate_body_blocks<'a>(&'a self) -> Vec<Self::Element<'a>>;

    fn kind<'a>(&'a self, element: Self::Element<'a>) -> ElementKind;

    fn paragraph_properties<'a>(&'a self, paragraph: Self::Element<'a>) -> Self::Properties<'a>;

    /// Runs of a paragraph in order, including runs nested in hyperlinks and content controls.
    fn iterate_runs<'a>(&'a self, paragraph: Self::Element<'a>) -> Vec<Self::Element<'a>>;

    fn run_properties<'a>(&'a self, run: Self::Element<'a>) -> Self::Properties<'a>;

    /// Concatenated text fragments of a run, unnormalized.
    fn run_text<'a>(&'a self, run: Self::Element<'a>) -> String;

    /// Relationship ids of images embedded in a run.
    fn run_media_refs<'a>(&'a self, run: Self::Element<'a>) -> Vec<&'a str>;

    fn iterate_rows<'a>(&'a self, table: Self::Element<'a>) -> Vec<Self::Element<'a>>;

    fn iterate_cells<'a>(&'a self, row: Self::Element<'a>) -> Vec<Self::Element<'a>>;

    /// Block-level children of a cell, in order.
    fn iterate_cell_blocks<'a>(&'a self, cell: Self::Element<'a>) -> Vec<Self::Element<'a>>;

    /// Bytes and declared media type behind a relationship id, if it resolves.
    fn resolve_media(&self, ref_id: &str) -> Option<Image>;
}
