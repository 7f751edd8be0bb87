//! Object storage for uploaded images (product photos, logo, gallery).
//!
//! Files are stored under a generated unique name so uploads can never
//! collide or traverse outside the storage root.

use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn path_of(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }

    /// Validates the original filename's extension against the whitelist.
    pub fn extension_of(original_name: &str) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| StoreError::Validation("file has no extension".into()))?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(StoreError::Validation(format!(
                "file type .{ext} is not allowed (accepted: {})",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        Ok(ext)
    }

    /// Writes the bytes under a fresh uuid name and returns the stored
    /// reference (a bare filename).
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let ext = Self::extension_of(original_name)?;
        let reference = format!("{}.{}", Uuid::new_v4().simple(), ext);
        tokio::fs::write(self.root.join(&reference), bytes).await?;
        Ok(reference)
    }

    /// Deletes a stored file. Missing files are ignored so removal stays
    /// idempotent.
    pub async fn delete(&self, reference: &str) -> Result<()> {
        validate_reference(reference)?;
        match tokio::fs::remove_file(self.root.join(reference)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// References must be bare filenames; anything path-like is rejected.
fn validate_reference(reference: &str) -> Result<()> {
    if reference.is_empty()
        || reference.contains('/')
        || reference.contains('\\')
        || reference.contains("..")
    {
        return Err(StoreError::Validation("invalid file reference".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_whitelist() {
        assert_eq!(FileStore::extension_of("photo.JPG").unwrap(), "jpg");
        assert_eq!(FileStore::extension_of("banner.webp").unwrap(), "webp");
        assert!(FileStore::extension_of("script.php").is_err());
        assert!(FileStore::extension_of("noextension").is_err());
    }

    #[test]
    fn test_reference_validation_rejects_traversal() {
        assert!(validate_reference("a1b2c3.png").is_ok());
        assert!(validate_reference("../etc/passwd").is_err());
        assert!(validate_reference("dir/file.png").is_err());
        assert!(validate_reference("").is_err());
    }

    #[tokio::test]
    async fn test_store_and_delete_roundtrip() {
        let root = std::env::temp_dir().join(format!("agriexport-test-{}", Uuid::new_v4()));
        let store = FileStore::new(&root);
        store.init().await.unwrap();

        let reference = store.store("banana.png", b"not-really-a-png").await.unwrap();
        assert!(reference.ends_with(".png"));
        assert!(store.path_of(&reference).exists());

        store.delete(&reference).await.unwrap();
        assert!(!store.path_of(&reference).exists());
        // second delete is a no-op
        store.delete(&reference).await.unwrap();

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
