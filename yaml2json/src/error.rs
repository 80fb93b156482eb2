//! Error types for YAML-to-JSON conversion.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning a YAML file into JSON output.
///
/// Every variant is terminal for a conversion; nothing is retried and no
/// partial output is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The input file could not be opened or read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// The input bytes are not valid UTF-8.
    #[error("{} is not valid UTF-8 (invalid byte at offset {valid_up_to})", path.display())]
    InvalidEncoding {
        /// The file with the bad encoding.
        path: PathBuf,
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// The content is not valid YAML, or holds a value JSON cannot express.
    #[error("YAML parse error in {}: {error}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// What went wrong and where. Shown inline rather than as a source.
        error: LoadError,
    },

    /// The parsed documents could not be rendered as JSON.
    #[error("failed to render JSON")]
    Serialize(#[from] serde_json::Error),

    /// The rendered JSON could not be written out.
    #[error("failed to write output")]
    Write(#[source] io::Error),
}

/// Category of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadErrorKind {
    /// The text is not well-formed YAML.
    Syntax,
    /// The stream exceeds a resource budget.
    Budget,
    /// A node carries a tag outside the core schema.
    UnsupportedTag,
    /// A scalar does not match its explicit tag.
    InvalidScalar,
    /// An integer does not fit in 64 bits.
    IntegerOutOfRange,
    /// A float is infinite or NaN.
    NonFiniteFloat,
    /// A mapping repeats a key.
    DuplicateKey,
    /// A mapping key is a sequence or a mapping.
    NonScalarKey,
    /// A merge key is not given a mapping or a list of mappings.
    InvalidMerge,
    /// An alias refers to a node that contains it.
    RecursiveAlias,
    /// Alias expansion copied in more nodes than allowed.
    AliasExpansionLimit,
}

/// A YAML stream that cannot be loaded as JSON data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// Category of the failure.
    pub kind: LoadErrorKind,
    /// Human-readable description.
    pub message: String,
    /// 1-based line of the offending node, 0 when not tied to a position.
    pub line: usize,
    /// 1-based column of the offending node.
    pub column: usize,
}

impl LoadError {
    /// Create an error that is not tied to a position yet.
    #[must_use]
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Attach a 1-based line and column.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            f.write_str(&self.message)
        } else {
            write!(
                f,
                "{} at line {} column {}",
                self.message, self.line, self.column
            )
        }
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::path::PathBuf;

    #[test]
    fn test_io_error_names_file_and_keeps_source() {
        let err = ConvertError::Io {
            path: PathBuf::from("missing.yaml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(err.to_string(), "failed to read missing.yaml");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("no such file"));
    }

    #[test]
    fn test_parse_error_includes_location() {
        let err = ConvertError::Parse {
            path: PathBuf::from("bad.yaml"),
            error: LoadError::new(LoadErrorKind::DuplicateKey, "duplicate mapping key `a`")
                .at(2, 1),
        };

        assert_eq!(
            err.to_string(),
            "YAML parse error in bad.yaml: duplicate mapping key `a` at line 2 column 1"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_load_error_without_position() {
        let err = LoadError::new(LoadErrorKind::Budget, "too many documents");
        assert_eq!(err.to_string(), "too many documents");
        assert_eq!(err.line, 0);
    }

    #[test]
    fn test_invalid_encoding_reports_offset() {
        let err = ConvertError::InvalidEncoding {
            path: PathBuf::from("latin1.yaml"),
            valid_up_to: 7,
        };

        assert_eq!(
            err.to_string(),
            "latin1.yaml is not valid UTF-8 (invalid byte at offset 7)"
        );
    }
}
