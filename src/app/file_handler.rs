//! File system helpers shared by the subcommands: input validation and
//! writing result tables.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Error as IoError, Write};
use std::path::Path;
use tracing::error;

use super::error::AppError;

/// Checks that `path` exists and is a directory.
///
/// # Errors
/// Returns `AppError::InvalidPath` when the directory is missing or `path`
/// names something else.
pub fn validate_dir(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        let msg = format!("Directory not found: {}", path.display());
        error!("Input Error: {}", msg);
        return Err(AppError::InvalidPath(msg));
    }
    if !path.is_dir() {
        let msg = format!("Path is not a directory: {}", path.display());
        error!("Input Error: {}", msg);
        return Err(AppError::InvalidPath(msg));
    }
    Ok(())
}

/// Checks that `path` exists and is a regular file.
pub fn validate_file(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        let msg = format!("File not found: {}", path.display());
        error!("Input Error: {}", msg);
        return Err(AppError::InvalidPath(msg));
    }
    if !path.is_file() {
        let msg = format!("Path is not a file: {}", path.display());
        error!("Input Error: {}", msg);
        return Err(AppError::InvalidPath(msg));
    }
    Ok(())
}

/// Writes string content to a file, creating parent directories and
/// truncating any previous content.
///
/// The writer is flushed before returning so callers see the complete file.
pub fn write_content_to_file(file_path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(file_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results/nested/out.csv");
        write_content_to_file(&path, "a,b\n1,2\n").unwrap();
        write_content_to_file(&path, "a,b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_validation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("case.toml");
        fs::write(&file, "").unwrap();

        assert!(validate_dir(dir.path()).is_ok());
        assert!(matches!(validate_dir(&file), Err(AppError::InvalidPath(_))));
        assert!(validate_file(&file).is_ok());
        assert!(matches!(validate_file(dir.path()), Err(AppError::InvalidPath(_))));
        assert!(matches!(
            validate_file(&dir.path().join("missing.toml")),
            Err(AppError::InvalidPath(_))
        ));
    }
}
