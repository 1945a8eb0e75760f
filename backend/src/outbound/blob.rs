//! Filesystem-backed blob store.
//!
//! Uploads land under a capability-scoped root directory; the adapter can
//! never write outside it. References are relative paths of the form
//! `prefix/uuid-filename`, where the uuid keeps successive uploads to the
//! same slot from colliding. cap-std I/O is synchronous, so each operation
//! runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BlobStore, BlobStoreError};

/// Blob store rooted at a directory on the local filesystem.
#[derive(Clone)]
pub struct DirectoryBlobStore {
    root: Arc<Dir>,
}

impl DirectoryBlobStore {
    /// Open a store rooted at `path`, creating the directory if absent.
    ///
    /// # Errors
    /// Returns a storage error when the root cannot be created or opened.
    pub fn open(path: &std::path::Path) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(path).map_err(map_io_error)?;
        let root = Dir::open_ambient_dir(path, ambient_authority()).map_err(map_io_error)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Wrap an already opened capability directory. Used by tests to root
    /// the store in a temporary directory.
    #[must_use]
    pub fn from_dir(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
        }
    }
}

fn map_io_error(error: std::io::Error) -> BlobStoreError {
    BlobStoreError::storage(error.to_string())
}

fn map_join_error(error: tokio::task::JoinError) -> BlobStoreError {
    BlobStoreError::storage(format!("blocking task failed: {error}"))
}

/// Reject references that could escape the root. Stored references are
/// always relative `prefix/name` paths, so anything else is corrupt.
fn validate_reference(reference: &str) -> Result<(), BlobStoreError> {
    let suspicious = reference.is_empty()
        || reference.starts_with('/')
        || reference.split('/').any(|segment| segment == "..");
    if suspicious {
        return Err(BlobStoreError::storage(format!(
            "invalid blob reference: {reference}"
        )));
    }
    Ok(())
}

#[async_trait]
impl BlobStore for DirectoryBlobStore {
    async fn store(
        &self,
        prefix: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, BlobStoreError> {
        validate_reference(prefix)?;
        let reference = format!("{prefix}/{}-{filename}", Uuid::new_v4());
        validate_reference(&reference)?;

        let root = Arc::clone(&self.root);
        let path = reference.clone();
        let payload = bytes.to_vec();
        tokio::task::spawn_blocking(move || {
            root.create_dir_all(prefix_of(&path))?;
            root.write(&path, payload)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_io_error)?;

        debug!(reference = %reference, "stored blob");
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), BlobStoreError> {
        validate_reference(reference)?;

        let root = Arc::clone(&self.root);
        let path = reference.to_owned();
        let outcome = tokio::task::spawn_blocking(move || root.remove_file(&path))
            .await
            .map_err(map_join_error)?;

        match outcome {
            Ok(()) => Ok(()),
            // Removing an absent blob is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(e)),
        }
    }
}

fn prefix_of(reference: &str) -> &str {
    reference.rsplit_once('/').map_or("", |(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn temp_store() -> (tempfile::TempDir, DirectoryBlobStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root =
            Dir::open_ambient_dir(dir.path(), ambient_authority()).expect("open temp dir");
        (dir, DirectoryBlobStore::from_dir(root))
    }

    #[rstest]
    #[tokio::test]
    async fn stored_blobs_come_back_under_their_prefix() {
        let (_guard, store) = temp_store();
        let reference = store
            .store("drafts/abc", "budget.xlsx", b"spreadsheet")
            .await
            .expect("store");
        assert!(reference.starts_with("drafts/abc/"));
        assert!(reference.ends_with("-budget.xlsx"));
    }

    #[rstest]
    #[tokio::test]
    async fn removing_an_absent_blob_is_a_no_op() {
        let (_guard, store) = temp_store();
        store
            .remove("drafts/abc/nothing-here.pdf")
            .await
            .expect("remove absent");
    }

    #[rstest]
    #[tokio::test]
    async fn traversal_references_are_rejected() {
        let (_guard, store) = temp_store();
        let err = store
            .remove("../outside.pdf")
            .await
            .expect_err("traversal");
        assert!(err.to_string().contains("invalid blob reference"));
    }
}
