mod common;

use coverdoc::{
    CoverFields, Error, FixedLayoutRenderer, Options, PageSize, PaginatedDocument, PdfRenderer,
    merge, render_cover,
};

fn body(pages: usize, page_size: PageSize) -> PaginatedDocument {
    let page = format!(
        "<p>{}</p>",
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(60)
    );
    let mut doc = PaginatedDocument {
        bytes: Vec::new(),
        page_count: 0,
    };
    let mut paragraphs = 1;
    while doc.page_count < pages {
        let markup = format!("<html><body>{}</body></html>", page.repeat(paragraphs));
        doc = PdfRenderer::new(page_size, 72.0).render(&markup).unwrap();
        paragraphs += 1;
    }
    assert_eq!(doc.page_count, pages, "fixture overshot the page count");
    doc
}

/// A structurally valid PDF whose page tree is empty.
fn zero_page_pdf() -> PaginatedDocument {
    use pdf_writer::{Pdf, Ref};
    let mut pdf = Pdf::new();
    pdf.catalog(Ref::new(1)).pages(Ref::new(2));
    pdf.pages(Ref::new(2)).kids(std::iter::empty::<Ref>()).count(0);
    PaginatedDocument {
        bytes: pdf.finish(),
        page_count: 0,
    }
}

#[test]
fn pages_are_concatenated_in_order() {
    common::init_logger();
    let cover = render_cover(&CoverFields::default(), &Options::default()).unwrap();
    let body = body(3, PageSize::A4);

    let merged = merge(&[cover, body]).unwrap();
    assert_eq!(merged.page_count, 4);
    assert_eq!(common::page_count(&merged.bytes), 4);

    let sizes = common::page_sizes(&merged.bytes);
    assert_eq!(sizes.len(), 4);
    assert!((sizes[0].0 - 612.0).abs() < 0.5, "cover keeps Letter: {sizes:?}");
    for size in &sizes[1..] {
        assert!((size.0 - 595.28).abs() < 0.5, "body keeps A4: {sizes:?}");
        assert!((size.1 - 841.89).abs() < 0.5);
    }
}

#[test]
fn merge_accepts_more_than_two_inputs() {
    let parts = [
        body(1, PageSize::Letter),
        body(2, PageSize::Letter),
        body(1, PageSize::A4),
    ];
    let merged = merge(&parts).unwrap();
    assert_eq!(merged.page_count, 4);
    let sizes = common::page_sizes(&merged.bytes);
    assert!((sizes[3].0 - 595.28).abs() < 0.5);
}

#[test]
fn zero_page_input_fails_the_merge() {
    let err = merge(&[body(1, PageSize::Letter), zero_page_pdf()]).unwrap_err();
    assert!(matches!(err, Error::Merge(_)), "{err}");
    assert!(!err.is_client_error());
    assert_eq!(err.user_message(), "Error generating PDF. Check logs for details.");
}

#[test]
fn corrupted_input_fails_the_merge() {
    let garbage = PaginatedDocument {
        bytes: b"%PDF-1.7\nthis is not really a pdf".to_vec(),
        page_count: 1,
    };
    let err = merge(&[body(1, PageSize::Letter), garbage]).unwrap_err();
    assert!(matches!(err, Error::Merge(_)), "{err}");
}

#[test]
fn single_input_is_rejected() {
    let err = merge(&[body(1, PageSize::Letter)]).unwrap_err();
    assert!(matches!(err, Error::Merge(_)));
}
