//! Read access to the content root

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use driveline_errors::{Error, Result};

/// What a provider knows about one entry below its root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path relative to the provider root
    pub path: PathBuf,
    /// Absolute location on disk
    pub physical_path: PathBuf,
    pub exists: bool,
    pub is_directory: bool,
    /// Size in bytes, for existing files
    pub length: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl FileInfo {
    fn missing(path: PathBuf, physical_path: PathBuf) -> Self {
        Self {
            path,
            physical_path,
            exists: false,
            is_directory: false,
            length: None,
            modified: None,
        }
    }

    /// Last path segment
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// A read-only view of a directory tree
#[async_trait]
pub trait FileProvider: Send + Sync + fmt::Debug {
    /// Directory every lookup is relative to
    fn root(&self) -> &Path;

    /// Describe the entry at `subpath`; a missing entry is not an error
    async fn file_info(&self, subpath: &Path) -> Result<FileInfo>;

    /// Read a UTF-8 file
    async fn read_to_string(&self, subpath: &Path) -> Result<String>;

    /// List a directory, sorted by name
    async fn read_dir(&self, subpath: &Path) -> Result<Vec<FileInfo>>;
}

/// [`FileProvider`] over the local file system.
///
/// Construction never touches the disk. A root that does not exist surfaces
/// as missing entries or I/O errors on first access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalFileProvider {
    root: PathBuf,
}

impl PhysicalFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map `subpath` below the root, refusing anything that could leave it
    fn physical(&self, subpath: &Path) -> Result<PathBuf> {
        for component in subpath.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::invalid_argument(
                        "subpath",
                        format!("{} escapes the content root", subpath.display()),
                    ));
                }
            }
        }
        Ok(self.root.join(subpath))
    }
}

#[async_trait]
impl FileProvider for PhysicalFileProvider {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn file_info(&self, subpath: &Path) -> Result<FileInfo> {
        let physical = self.physical(subpath)?;
        match tokio::fs::metadata(&physical).await {
            Ok(metadata) => Ok(FileInfo {
                path: subpath.to_path_buf(),
                physical_path: physical,
                exists: true,
                is_directory: metadata.is_dir(),
                length: metadata.is_file().then(|| metadata.len()),
                modified: metadata.modified().ok(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(FileInfo::missing(subpath.to_path_buf(), physical))
            }
            Err(e) => Err(Error::io_with_path(&e, physical)),
        }
    }

    async fn read_to_string(&self, subpath: &Path) -> Result<String> {
        let physical = self.physical(subpath)?;
        tokio::fs::read_to_string(&physical)
            .await
            .map_err(|e| Error::io_with_path(&e, physical))
    }

    async fn read_dir(&self, subpath: &Path) -> Result<Vec<FileInfo>> {
        let physical = self.physical(subpath)?;
        let mut entries = tokio::fs::read_dir(&physical)
            .await
            .map_err(|e| Error::io_with_path(&e, &physical))?;

        let mut infos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, &physical))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| Error::io_with_path(&e, entry.path()))?;
            infos.push(FileInfo {
                path: subpath.join(entry.file_name()),
                physical_path: entry.path(),
                exists: true,
                is_directory: metadata.is_dir(),
                length: metadata.is_file().then(|| metadata.len()),
                modified: metadata.modified().ok(),
            });
        }
        infos.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(infos)
    }
}
