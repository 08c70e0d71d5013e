use std::path::Path;

use eyre::{Result, WrapErr};

/// Read a UTF-8 file, naming the path in the error.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.ts");

        write_file(&path, "hello").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("c").join("test.ts");

        write_file(&path, "nested").unwrap();

        assert_eq!(read_file(&path).unwrap(), "nested");
    }

    #[test]
    fn test_write_file_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.ts");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(read_file(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.ts");

        let err = read_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.ts"));
    }
}
