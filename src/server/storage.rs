//! Temporary upload storage
//!
//! Uploaded files are written under a generated name and removed again when
//! the returned guard is dropped, whether the request succeeded or not.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::utils::error::Result;

/// Directory holding in-flight uploads
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    /// Use `dir` for uploads, creating it if absent
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh file and return its cleanup guard
    ///
    /// The client's filename only contributes its extension; the stem is a
    /// random UUID so concurrent uploads never share a path.
    pub async fn save(&self, bytes: &[u8], original_name: Option<&str>) -> Result<TempUpload> {
        let upload = TempUpload {
            path: self.dir.join(unique_name(original_name)),
        };
        tokio::fs::write(&upload.path, bytes).await?;
        debug!("Stored {} byte upload at {:?}", bytes.len(), upload.path);
        Ok(upload)
    }
}

fn unique_name(original_name: Option<&str>) -> String {
    let id = Uuid::new_v4();
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

/// A stored upload; the file is deleted when this is dropped
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {:?}: {}", self.path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("uploads");
        let storage = UploadStorage::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(root.path()).unwrap();

        let upload = storage.save(b"payload", Some("cat.png")).await.unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_paths() {
        let root = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(root.path()).unwrap();

        let a = storage.save(b"a", Some("image.jpg")).await.unwrap();
        let b = storage.save(b"b", Some("image.jpg")).await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"a");
    }

    #[test]
    fn test_unique_name_sanitizes_client_name() {
        assert!(unique_name(Some("photo.PNG")).ends_with(".png"));
        assert!(!unique_name(Some("../../etc/passwd")).contains('/'));
        assert!(!unique_name(Some("evil.p/ng")).contains('/'));
        assert!(!unique_name(None).contains('.'));
    }
}
