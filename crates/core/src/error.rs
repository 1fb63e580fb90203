//! Error types for HTML to slide conversion.
//!
//! The transducer itself cannot fail. Every variant here belongs to one of
//! the I/O collaborators: reading HTML input or reading/writing PPTX files.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading input or writing the presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The HTML input is not valid UTF-8.
    #[error("Invalid input encoding: {0}")]
    InvalidEncoding(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML reading or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Failed to assemble the output presentation.
    #[error("PPTX write error: {0}")]
    PptxWriteError(String),

    /// The PPTX file structure could not be read.
    #[error("PPTX read error: {0}")]
    PptxReadError(String),
}
