//! Storage directory module
//!
//! The storage directory is the only catalog: every stored file lives directly
//! under it, and listings and static lookups read it at request time.

mod id;

pub use id::FileId;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors raised while preparing the storage directory at startup
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("can't resolve the current working directory: {0}")]
    WorkingDir(#[source] io::Error),
    #[error("can't create storage directory {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to the storage directory
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Resolve `dir` against the working directory and create it if missing
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        let root = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(StorageError::WorkingDir)?
                .join(dir)
        };

        std::fs::create_dir_all(&root).map_err(|source| StorageError::Create {
            path: root.clone(),
            source,
        })?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new, empty file named `name` directly under the root
    ///
    /// Fails if the file already exists.
    pub async fn create(&self, name: &str) -> io::Result<fs::File> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(name))
            .await
    }

    /// Delete the stored file `name`, logging anything but a missing file
    pub async fn remove(&self, name: &str) {
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => crate::logger::log_debug(&format!("Removed partial upload {name}")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => crate::logger::log_error(&format!("Can't remove partial upload {name}: {e}")),
        }
    }

    /// Names of every entry in the directory, in enumeration order
    pub async fn list(&self) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    /// Resolve a request-supplied name to a regular file inside the root
    ///
    /// Returns `None` for missing files, directories and anything that
    /// resolves outside the root.
    pub async fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        let root = fs::canonicalize(&self.root).await.ok()?;
        let candidate = fs::canonicalize(root.join(name)).await.ok()?;
        if !candidate.starts_with(&root) || candidate == root {
            crate::logger::log_warning(&format!(
                "Path traversal attempt blocked: {name} -> {}",
                candidate.display()
            ));
            return None;
        }

        let meta = fs::metadata(&candidate).await.ok()?;
        meta.is_file().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("storage");
        let storage = Storage::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.root(), dir.as_path());
    }

    #[test]
    fn test_open_rejects_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("storage");
        std::fs::write(&blocker, b"not a dir").unwrap();
        assert!(matches!(
            Storage::open(&blocker),
            Err(StorageError::Create { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_refuses_existing_name() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        storage.create("a.txt").await.unwrap();
        let err = storage.create("a.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        storage.create("partial.bin").await.unwrap();
        storage.remove("partial.bin").await;
        assert!(!tmp.path().join("partial.bin").exists());

        // Already gone is not an error
        storage.remove("partial.bin").await;
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_includes_files_and_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path()).unwrap();
        std::fs::write(tmp.path().join("one.txt"), b"1").unwrap();
        std::fs::write(tmp.path().join("two.bin"), b"2").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let mut names = storage.list().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["one.txt", "sub", "two.bin"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::open(tmp.path().join("gone")).unwrap();
        std::fs::remove_dir(tmp.path().join("gone")).unwrap();
        assert!(storage.list().await.is_err());
    }

    #[tokio::test]
    async fn test_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("storage");
        let storage = Storage::open(&root).unwrap();
        std::fs::write(root.join("file.txt"), b"x").unwrap();
        std::fs::create_dir(root.join("sub")).unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"s").unwrap();

        assert!(storage.resolve("file.txt").await.is_some());
        assert!(storage.resolve("missing.txt").await.is_none());
        assert!(storage.resolve("sub").await.is_none());
        assert!(storage.resolve("").await.is_none());
        assert!(storage.resolve("../secret.txt").await.is_none());
        assert!(storage.resolve("sub/../../secret.txt").await.is_none());
    }
}
