use std::sync::Arc;

use aws_sdk_s3::{primitives::ByteStream, types::Object, Client as S3Client};
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::{
    is_valid_namespace, join_public_url, sort_newest_first, BucketError, BucketResult,
    MediaStorage, StoredObject,
};

/// Media storage backed by an S3-compatible bucket
pub struct S3MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl S3MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `public_base_url` - Base URL under which the bucket's objects are publicly served
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }

    fn to_stored_object(prefix: &str, object: &Object) -> Option<StoredObject> {
        let name = object.key()?.strip_prefix(prefix)?;
        // Skip the folder placeholder and anything nested below the namespace
        if name.is_empty() || name.contains('/') {
            return None;
        }

        let created_at = object
            .last_modified()
            .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()));

        Some(StoredObject {
            name: name.to_string(),
            size: object
                .size()
                .and_then(|size| u64::try_from(size).ok())
                .unwrap_or(0),
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl MediaStorage for S3MediaStorage {
    /// S3 lists keys lexicographically, so the whole namespace is paged through
    /// before ordering by creation time and truncating.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::InvalidInput` for an unusable namespace,
    /// `BucketError::UpstreamError` for 5xx responses and `BucketError::S3Error` otherwise
    #[instrument(skip(self))]
    async fn list(&self, namespace: &str, limit: usize) -> BucketResult<Vec<StoredObject>> {
        if !is_valid_namespace(namespace) {
            return Err(BucketError::InvalidInput(format!(
                "invalid namespace: {namespace:?}"
            )));
        }

        let prefix = format!("{namespace}/");
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(&prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            objects.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| Self::to_stored_object(&prefix, object)),
            );
        }

        sort_newest_first(&mut objects);
        objects.truncate(limit);

        tracing::debug!(count = objects.len(), "Listed objects");

        Ok(objects)
    }

    /// Conditional put: `If-None-Match: *` makes S3 refuse to replace an existing key.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ObjectExists` if the key is taken
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> BucketResult<String> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| BucketError::from_put_error(key, err))?;

        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base_url, key)
    }
}
