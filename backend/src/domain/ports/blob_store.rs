//! Port for uploaded file storage.
//!
//! The domain only ever holds opaque reference strings; bytes go in and
//! out of the adapter. Extension validation happens in the domain before
//! anything reaches this port.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The backing store could not complete the operation.
        Storage { message: String } =>
            "blob store operation failed: {message}",
    }
}

/// Port for storing and discarding uploaded files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a caller-chosen key prefix, returning the opaque
    /// reference to persist.
    async fn store(
        &self,
        prefix: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, BlobStoreError>;

    /// Discard a previously stored blob. Removing an absent blob is not
    /// an error.
    async fn remove(&self, reference: &str) -> Result<(), BlobStoreError>;
}

/// Fixture implementation that fabricates references and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn store(
        &self,
        prefix: &str,
        filename: &str,
        _bytes: &[u8],
    ) -> Result<String, BlobStoreError> {
        Ok(format!("{prefix}/{filename}"))
    }

    async fn remove(&self, _reference: &str) -> Result<(), BlobStoreError> {
        Ok(())
    }
}
