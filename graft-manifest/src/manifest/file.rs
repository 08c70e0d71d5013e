use std::path::{Path, PathBuf};

use super::Manifest;
use crate::Result;

/// Represents a graft.toml file with both raw content and parsed manifest.
pub struct GraftToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl GraftToml {
    /// Open and parse a graft.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory containing graft.toml; relative paths resolve against it.
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Destination source root.
    pub fn project_root(&self) -> PathBuf {
        self.manifest.project_root(self.base_dir())
    }

    /// Staging root.
    pub fn staging_root(&self) -> PathBuf {
        self.manifest.staging_root(self.base_dir())
    }

    /// Template override directory, if configured.
    pub fn templates_root(&self) -> Option<PathBuf> {
        self.manifest.templates_root(self.base_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graft.toml");
        std::fs::write(
            &path,
            "[project]\nroot = \"app/src\"\ntemplates_dir = \"tpl\"\n",
        )
        .unwrap();

        let toml = GraftToml::open(&path).unwrap();
        assert_eq!(toml.base_dir(), dir.path());
        assert_eq!(toml.project_root(), dir.path().join("app/src"));
        assert_eq!(toml.staging_root(), dir.path().join(".graft/staging"));
        assert_eq!(toml.templates_root(), Some(dir.path().join("tpl")));
        assert!(toml.content().contains("app/src"));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraftToml::open(dir.path().join("graft.toml"))
            .err()
            .unwrap();
        assert!(matches!(*err, crate::Error::Io { .. }));
    }

    #[test]
    fn test_bare_filename_base_dir() {
        let toml = GraftToml {
            path: PathBuf::from("graft.toml"),
            content: String::new(),
            manifest: Manifest::default(),
        };
        assert_eq!(toml.base_dir(), Path::new("."));
        assert_eq!(toml.project_root(), Path::new("./src"));
    }
}
