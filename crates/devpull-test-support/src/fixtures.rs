//! Filesystem fixtures for devpull tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a prefixed temporary directory for one test.
///
/// # Errors
///
/// Returns an error when the directory cannot be created.
pub fn temp_dir() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("devpull-").tempdir()
}

/// Write `bytes` to `name` inside `dir` and return the full path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_is_prefixed_and_writable() -> io::Result<()> {
        let dir = temp_dir()?;
        let file_name = dir
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        assert!(file_name.starts_with("devpull-"));

        let path = write_file(dir.path(), "probe.bin", b"abc")?;
        assert_eq!(fs::read(path)?, b"abc");
        Ok(())
    }
}
