//! Error types for presentation manipulation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, editing, or writing a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read, or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// A caller-supplied value failed validation.
    #[error("{0}")]
    InvalidParameter(String),

    /// An index into slides, layouts, shapes, rows, or columns is out of range.
    #[error("Invalid {kind} index: {index}. {}", available_range(.kind, .count))]
    InvalidIndex {
        kind: &'static str,
        index: i64,
        count: usize,
    },

    /// A named element (placeholder, template, run) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A shape or operation does not support the request.
    #[error("{0}")]
    Unsupported(String),

    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Slide template library could not be loaded or applied.
    #[error("Template error: {0}")]
    TemplateError(String),
}

fn available_range(kind: &str, count: &usize) -> String {
    if *count == 0 {
        format!("No {kind}s available")
    } else {
        format!("Available {kind}s: 0-{}", count - 1)
    }
}

impl Error {
    /// Build an index error for a collection of `count` items.
    pub fn index(kind: &'static str, index: i64, count: usize) -> Self {
        Error::InvalidIndex { kind, index, count }
    }

    /// Build a parameter validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::TemplateError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_lists_range() {
        let err = Error::index("slide", 5, 3);
        assert_eq!(
            err.to_string(),
            "Invalid slide index: 5. Available slides: 0-2"
        );
    }

    #[test]
    fn test_index_error_empty_collection() {
        let err = Error::index("shape", 0, 0);
        assert_eq!(err.to_string(), "Invalid shape index: 0. No shapes available");
    }
}
