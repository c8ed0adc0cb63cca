//! In-memory media storage for tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    is_valid_namespace, join_public_url, sort_newest_first, BucketError, BucketResult,
    MediaStorage, StoredObject,
};

/// Base URL of objects held by [`InMemoryMediaStorage`]
pub const IN_MEMORY_BASE_URL: &str = "http://storage.test/images";

#[derive(Debug, Clone)]
struct StoredBlob {
    object: StoredObject,
    content_type: String,
    data: Vec<u8>,
}

/// Media storage keeping objects in a map, with switches to simulate outages
#[derive(Default)]
pub struct InMemoryMediaStorage {
    objects: RwLock<BTreeMap<String, StoredBlob>>,
    upload_calls: AtomicUsize,
    list_calls: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_listing: AtomicBool,
}

impl InMemoryMediaStorage {
    /// Creates an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload fail with an upstream error
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Makes every following listing fail with an upstream error
    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Number of upload attempts received, including failed ones
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of listing attempts received
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Keys of all stored objects, sorted
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Content type and bytes stored under `key`
    pub async fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|blob| (blob.content_type.clone(), blob.data.clone()))
    }

    /// Stores an object directly with a chosen creation time, bypassing upload checks
    pub async fn insert(&self, key: &str, data: Vec<u8>, created_at: chrono::DateTime<Utc>) {
        let name = key.rsplit('/').next().unwrap_or(key).to_string();
        let blob = StoredBlob {
            object: StoredObject {
                name,
                size: data.len() as u64,
                created_at: Some(created_at),
            },
            content_type: "application/octet-stream".to_string(),
            data,
        };
        self.objects.write().await.insert(key.to_string(), blob);
    }
}

#[async_trait::async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn list(&self, namespace: &str, limit: usize) -> BucketResult<Vec<StoredObject>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError("simulated outage".to_string()));
        }
        if !is_valid_namespace(namespace) {
            return Err(BucketError::InvalidInput(format!(
                "invalid namespace: {namespace:?}"
            )));
        }

        let prefix = format!("{namespace}/");
        let mut objects: Vec<StoredObject> = self
            .objects
            .read()
            .await
            .iter()
            .filter(|(key, _)| {
                key.strip_prefix(&prefix)
                    .is_some_and(|name| !name.is_empty() && !name.contains('/'))
            })
            .map(|(_, blob)| blob.object.clone())
            .collect();

        sort_newest_first(&mut objects);
        objects.truncate(limit);
        Ok(objects)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<String> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError("simulated outage".to_string()));
        }

        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(BucketError::ObjectExists(key.to_string()));
        }

        let name = key.rsplit('/').next().unwrap_or(key).to_string();
        objects.insert(
            key.to_string(),
            StoredBlob {
                object: StoredObject {
                    name,
                    size: data.len() as u64,
                    created_at: Some(Utc::now()),
                },
                content_type: content_type.to_string(),
                data,
            },
        );

        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(IN_MEMORY_BASE_URL, key)
    }
}
