//! Error types for doxman library.

use std::io;
use thiserror::Error;

/// Result type alias for doxman operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a documentation run.
///
/// Recoverable defects (dangling references, unsupported markup, ragged
/// tables) are never reported through this type; they are collected as
/// [`Warning`](crate::render::Warning)s alongside the rendered pages.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading extractor output or writing pages.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An XML document produced by the extractor could not be parsed.
    #[error("XML error in {file}: {message}")]
    Xml {
        /// File name (or `<string>` for in-memory input)
        file: String,
        /// Parser message
        message: String,
    },

    /// An entity has no derivable identity, so its page cannot be named.
    #[error("Entity '{id}' of kind {kind} has no name")]
    MissingIdentity {
        /// Extractor id of the entity (may be empty)
        id: String,
        /// Entity kind as written by the extractor
        kind: String,
    },

    /// Two entities of the same kind and spelling claim the same page.
    #[error("Cannot have {first} and {second} man pages both named '{page}'")]
    DuplicatePage {
        /// The contested page file name
        page: String,
        /// Description of the entity that claimed the page first
        first: String,
        /// Description of the entity that collided with it
        second: String,
    },

    /// Manual section outside 1-9.
    #[error("Invalid manual section {0}: expected a number between 1 and 9")]
    InvalidSection(u8),

    /// A file exclusion pattern failed to compile.
    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(String),

    /// Error during rendering or serialization.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidPattern(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSection(12);
        assert_eq!(
            err.to_string(),
            "Invalid manual section 12: expected a number between 1 and 9"
        );

        let err = Error::DuplicatePage {
            page: "foo.3".to_string(),
            first: "function foo".to_string(),
            second: "function foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot have function foo and function foo man pages both named 'foo.3'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_regex_error_conversion() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }
}
