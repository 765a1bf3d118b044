//! Directory-tree helpers shared by case preparation and sweeps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

//─────────────────────────────────────────────────────────────────────────────

/// Recursively copies `src` into `dst`, merging with anything already there.
///
/// Existing files at the destination are overwritten. Returns the number of
/// files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Removes a directory tree if it exists. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    if path.exists() {
        fs::remove_dir_all(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Removes `path` if present and recreates it empty.
pub fn recreate_dir(path: &Path) -> io::Result<()> {
    remove_dir_if_exists(path)?;
    fs::create_dir_all(path)
}

/// Collects every file below `root` whose name ends in `.<extension>`, sorted.
pub fn files_with_extension(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_merges_trees() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(src.join("system/include")).unwrap();
        fs::write(src.join("system/controlDict"), "new").unwrap();
        fs::write(src.join("system/include/common"), "x").unwrap();
        fs::create_dir_all(dst.join("system")).unwrap();
        fs::write(dst.join("system/controlDict"), "old").unwrap();
        fs::write(dst.join("system/fvSchemes"), "keep").unwrap();

        let copied = copy_dir_recursive(&src, &dst).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("system/controlDict")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.join("system/fvSchemes")).unwrap(), "keep");
        assert!(dst.join("system/include/common").is_file());
    }

    #[test]
    fn test_recreate_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("case");
        fs::create_dir_all(target.join("0")).unwrap();
        recreate_dir(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
        assert!(remove_dir_if_exists(&target).unwrap());
        assert!(!remove_dir_if_exists(&target).unwrap());
    }

    #[test]
    fn test_files_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("system")).unwrap();
        fs::write(dir.path().join("system/controlDict.j2"), "").unwrap();
        fs::write(dir.path().join("system/fvSchemes"), "").unwrap();
        fs::write(dir.path().join("a.j2"), "").unwrap();
        let found = files_with_extension(dir.path(), "j2").unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.j2"), dir.path().join("system/controlDict.j2")]
        );
    }
}
