//! Filesystem storage for uploaded avatar images.
//!
//! Files are written under `<static_root>/avatars` with the deterministic
//! name `{phone}_{original_filename}`, so re-uploading for the same phone
//! with the same filename silently overwrites the previous file.  The store
//! only writes and names files; serving them is the router's `/static`
//! surface.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};

use crate::error::ApiError;

/// Public URL prefix under which stored avatars are retrievable.
pub const AVATAR_URL_PREFIX: &str = "/static/avatars";

#[derive(Debug, Clone)]
pub struct AvatarStore {
    avatar_dir: PathBuf,
    max_size: usize,
}

impl AvatarStore {
    /// Create the avatars directory under `static_root` (if missing) and
    /// return a store rooted there.
    pub async fn new(static_root: PathBuf, max_size: usize) -> Result<Self, ApiError> {
        let avatar_dir = static_root.join("avatars");

        fs::create_dir_all(&avatar_dir).await.map_err(|e| {
            ApiError::StorageUnavailable(format!(
                "Failed to create avatar directory '{}': {}",
                avatar_dir.display(),
                e
            ))
        })?;

        info!(path = %avatar_dir.display(), "Avatar store initialized");

        Ok(Self {
            avatar_dir,
            max_size,
        })
    }

    /// Persist an uploaded avatar and return its public reference, e.g.
    /// `/static/avatars/13800138000_me.png`.
    ///
    /// Overwriting an existing file with the same phone + filename is
    /// accepted, deterministic behavior.
    pub async fn store(
        &self,
        phone: &str,
        original_filename: &str,
        data: &[u8],
    ) -> Result<String, ApiError> {
        if data.is_empty() {
            return Err(ApiError::BadRequest("Empty avatar upload".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ApiError::AvatarTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let file_name = safe_file_name(phone, original_filename)?;
        let path = self.avatar_dir.join(&file_name);

        fs::write(&path, data).await.map_err(|e| {
            ApiError::StorageUnavailable(format!("Failed to write avatar '{}': {}", file_name, e))
        })?;

        debug!(file = %file_name, size = data.len(), "Stored avatar");
        Ok(format!("{AVATAR_URL_PREFIX}/{file_name}"))
    }
}

/// Build the `{phone}_{original_filename}` name, rejecting any component
/// that could escape the avatars directory.  Phone is only length-checked
/// upstream, so it gets the same scrutiny as the client filename.
fn safe_file_name(phone: &str, original_filename: &str) -> Result<String, ApiError> {
    for part in [phone, original_filename] {
        if part.is_empty()
            || part.contains('/')
            || part.contains('\\')
            || part.contains("..")
            || part.contains('\0')
        {
            return Err(ApiError::BadRequest(
                "Path traversal detected".to_string(),
            ));
        }
    }
    Ok(format!("{phone}_{original_filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (AvatarStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = AvatarStore::new(dir.path().to_path_buf(), 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_returns_public_reference() {
        let (store, dir) = test_store().await;

        let reference = store
            .store("12345678901", "me.png", b"png-bytes")
            .await
            .unwrap();
        assert_eq!(reference, "/static/avatars/12345678901_me.png");

        let on_disk = dir.path().join("avatars").join("12345678901_me.png");
        assert_eq!(std::fs::read(on_disk).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_same_name_overwrites() {
        let (store, dir) = test_store().await;

        store.store("12345678901", "me.png", b"first").await.unwrap();
        let reference = store
            .store("12345678901", "me.png", b"second")
            .await
            .unwrap();
        assert_eq!(reference, "/static/avatars/12345678901_me.png");

        let on_disk = dir.path().join("avatars").join("12345678901_me.png");
        assert_eq!(std::fs::read(on_disk).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_distinct_phones_never_collide() {
        let (store, dir) = test_store().await;

        store.store("12345678901", "me.png", b"alice").await.unwrap();
        store.store("98765432109", "me.png", b"bob").await.unwrap();

        let avatars = dir.path().join("avatars");
        assert_eq!(
            std::fs::read(avatars.join("12345678901_me.png")).unwrap(),
            b"alice"
        );
        assert_eq!(
            std::fs::read(avatars.join("98765432109_me.png")).unwrap(),
            b"bob"
        );
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (store, _dir) = test_store().await;

        for (phone, name) in [
            ("12345678901", "../evil.png"),
            ("12345678901", "a/b.png"),
            ("12345678901", "a\\b.png"),
            ("../2345678901", "me.png"),
            ("12345678901", ""),
        ] {
            let err = store.store(phone, name, b"data").await.unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{phone} {name}");
        }
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (store, _dir) = test_store().await;
        let err = store.store("12345678901", "me.png", b"").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let dir = TempDir::new().unwrap();
        let store = AvatarStore::new(dir.path().to_path_buf(), 8).await.unwrap();

        let err = store
            .store("12345678901", "me.png", b"way too many bytes")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AvatarTooLarge { .. }));
    }
}
