//! Test utilities for benchgen
//!
//! This crate provides shared testing utilities used across the benchgen workspace.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` under the current directory
///
/// Cargo runs tests from the package root, so test files end up in a single
/// gitignored location that is easy to clean up manually if needed.
///
/// # Panics
///
/// Panics if:
/// - Unable to determine current directory
/// - Unable to create `.tmp/` directory
/// - Unable to create temporary subdirectory
///
/// # Examples
///
/// ```rust
/// use benchgen_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Write `content` to `dir/rel`, creating parent directories, and return the path
///
/// # Panics
///
/// Panics if the directory or file cannot be created.
pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", parent.display(), e));
    }
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
    path
}

/// Number of lines in `text` equal to `line`
pub fn count_lines(text: &str, line: &str) -> usize {
    text.lines().filter(|l| *l == line).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_creates_in_tmp() {
        let temp = temp_dir_in_workspace();
        let path = temp.path();

        assert!(
            path.to_string_lossy().contains(".tmp"),
            "Path should contain .tmp, got: {}",
            path.display()
        );
        assert!(path.is_dir(), "Path should be a directory");
    }

    #[test]
    fn test_temp_dir_auto_cleanup() {
        let path = {
            let temp = temp_dir_in_workspace();
            let p = temp.path().to_path_buf();
            assert!(p.exists(), "Directory should exist before drop");
            p
        };

        assert!(
            !path.exists(),
            "Directory should not exist after drop: {}",
            path.display()
        );
    }

    #[test]
    fn test_multiple_temp_dirs_unique() {
        let temp1 = temp_dir_in_workspace();
        let temp2 = temp_dir_in_workspace();
        assert_ne!(temp1.path(), temp2.path());
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp = temp_dir_in_workspace();
        let path = write_file(temp.path(), "a/b/c.txt", "hello");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_count_lines_matches_whole_lines() {
        let text = "  a1,\n  a1,\n  a10,\n";
        assert_eq!(count_lines(text, "  a1,"), 2);
        assert_eq!(count_lines(text, "a1,"), 0);
    }
}
