//! Reading YAML sources from disk.

use std::path::Path;

use tracing::debug;

use crate::error::ConvertError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a YAML file into memory as UTF-8 text.
///
/// The file is read as raw bytes and the handle is released before this
/// returns, on success and failure alike. A leading UTF-8 byte-order mark
/// is dropped.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file cannot be opened or read, and
/// [`ConvertError::InvalidEncoding`] if its content is not UTF-8.
pub fn read_source(path: &Path) -> Result<String, ConvertError> {
    let mut buffer = std::fs::read(path).map_err(|source| ConvertError::Io {
        path: path.to_owned(),
        source,
    })?;
    debug!(file = %path.display(), bytes = buffer.len(), "read YAML source");

    if buffer.starts_with(UTF8_BOM) {
        buffer.drain(..UTF8_BOM.len());
    }

    String::from_utf8(buffer).map_err(|e| ConvertError::InvalidEncoding {
        path: path.to_owned(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_read_source_plain_text() {
        let file = create_temp_file(b"a: 1\n");
        assert_eq!(read_source(file.path()).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_read_source_strips_bom() {
        let file = create_temp_file(b"\xEF\xBB\xBFa: 1\n");
        assert_eq!(read_source(file.path()).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_read_source_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");

        let err = read_source(&missing).unwrap_err();
        match err {
            ConvertError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other}"),
        }
    }

    #[test]
    fn test_read_source_rejects_invalid_utf8() {
        let file = create_temp_file(b"key: caf\xE9\n");

        let err = read_source(file.path()).unwrap_err();
        assert!(
            matches!(err, ConvertError::InvalidEncoding { valid_up_to: 8, .. }),
            "unexpected error: {err}"
        );
    }
}
