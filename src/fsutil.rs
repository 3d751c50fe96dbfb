use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Error that occurs when reading a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reads the file at the given path to completion and returns its contents.
///
/// The status file is a small kernel-exported snapshot and is parsed as a
/// whole, so no buffered streaming is involved.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read.
///
/// # Example
/// ```no_run
/// # use drbd_check::fsutil;
/// let raw = fsutil::read_to_string("/proc/drbd")?;
/// # Ok::<(), fsutil::FileReadError>(())
/// ```
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, FileReadError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_read_to_string_success() {
        let mut tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        tmp.write_all(b"version: 8.4.11\n")
            .expect("failed to write temp file");
        let contents = read_to_string(tmp.path()).expect("should read test file");
        assert_eq!(contents, "version: 8.4.11\n");
    }

    #[test]
    fn test_read_to_string_error() {
        let result = read_to_string("/definitely/does/not/exist");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }
}
