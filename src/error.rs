use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum Error {
    /// The upload is not a readable word-processing package.
    DocumentParse(String),
    /// The upload is a format this pipeline does not convert (e.g. legacy `.doc`).
    UnsupportedFormat(String),
    /// Paginated documents could not be concatenated.
    Merge(String),
    /// The fixed-layout renderer failed to paginate the markup.
    Render(String),
    /// The fixed-layout renderer did not finish within the request timeout.
    Timeout(Duration),
    Io(std::io::Error),
}

impl Error {
    /// Message safe to show to the person who submitted the request.
    pub fn user_message(&self) -> String {
        match self {
            Error::DocumentParse(_) => {
                "The uploaded file could not be read. It may be corrupted or not a valid .docx document."
                    .to_string()
            }
            Error::UnsupportedFormat(detail) => format!(
                "{detail}. Please save the document as .docx (Word 2007 or later) and submit it again."
            ),
            Error::Timeout(_) => {
                "Converting the document took too long. Please try again with a smaller file."
                    .to_string()
            }
            Error::Merge(_) | Error::Render(_) | Error::Io(_) => {
                "Error generating PDF. Check logs for details.".to_string()
            }
        }
    }

    /// True when the request itself was at fault (bad upload), false for server-side failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::DocumentParse(_) | Error::UnsupportedFormat(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DocumentParse(msg) => write!(f, "invalid DOCX: {msg}"),
            Error::UnsupportedFormat(msg) => write!(f, "unsupported format: {msg}"),
            Error::Merge(msg) => write!(f, "PDF merge failed: {msg}"),
            Error::Render(msg) => write!(f, "PDF render failed: {msg}"),
            Error::Timeout(limit) => {
                write!(f, "rendering exceeded the {:.1}s timeout", limit.as_secs_f64())
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::DocumentParse(format!("file is not a ZIP archive ({e})"))
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::DocumentParse(format!("malformed XML: {e}"))
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Merge(e.to_string())
    }
}
