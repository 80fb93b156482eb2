//! Writing rendered JSON to its destination.

use std::io::Write;

use crate::error::ConvertError;

/// Write the rendered JSON to `writer` and flush it.
///
/// # Errors
///
/// Returns [`ConvertError::Write`] if writing or flushing fails.
pub fn write_output(json: &[u8], writer: &mut dyn Write) -> Result<(), ConvertError> {
    writer.write_all(json).map_err(ConvertError::Write)?;
    writer.flush().map_err(ConvertError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_output_copies_bytes() {
        let mut sink = Vec::new();
        write_output(b"[]\n", &mut sink).unwrap();
        assert_eq!(sink, b"[]\n");
    }

    #[test]
    fn test_write_output_reports_write_failure() {
        let err = write_output(b"[]\n", &mut ClosedPipe).unwrap_err();
        assert!(matches!(err, ConvertError::Write(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
