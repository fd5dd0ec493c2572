//! Error types for deck patching.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening, editing, or saving a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error in a package part.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A required package part is absent from the archive.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A slide index beyond the end of the deck was requested.
    #[error("Slide index out of range: {0}")]
    SlideOutOfRange(usize),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    Corrupted(String),
}
