//! Object storage for uploaded images
//!
//! Every object lives under the namespace of the user that uploaded it:
//! `<userId>/<name>`. Listing is always scoped to one namespace.

mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod s3;

use chrono::{DateTime, Utc};

pub use error::{BucketError, BucketResult};
pub use s3::S3MediaStorage;

/// Longest accepted namespace
const MAX_NAMESPACE_LEN: usize = 128;

/// Metadata of an object stored under a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object name relative to the namespace
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Creation time, when the storage reports one
    pub created_at: Option<DateTime<Utc>>,
}

/// Storage gateway used by the image endpoints
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Lists at most `limit` objects of `namespace`, newest first
    async fn list(&self, namespace: &str, limit: usize) -> BucketResult<Vec<StoredObject>>;

    /// Stores `data` under `key` without overwriting, returns the stored key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<String>;

    /// Public URL of the object stored under `key`
    fn public_url(&self, key: &str) -> String;
}

/// Whether `namespace` can scope stored objects without escaping into another one
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace.len() <= MAX_NAMESPACE_LEN
        && namespace != "."
        && namespace != ".."
        && !namespace.contains('/')
        && !namespace.chars().any(char::is_control)
}

/// Full storage key of `name` inside `namespace`
#[must_use]
pub fn object_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// Orders newest first, objects without a creation time last
pub(crate) fn sort_newest_first(objects: &mut [StoredObject]) {
    objects.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    });
}

/// Public URL of `key` below `base_url`
pub(crate) fn join_public_url(base_url: &str, key: &str) -> String {
    format!("{}/{key}", base_url.trim_end_matches('/'))
}
