//! Error types for bucket operations

use aws_sdk_s3::{
    error::SdkError,
    operation::{list_objects_v2::ListObjectsV2Error, put_object::PutObjectError},
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Object already exists in bucket, uploads never overwrite
    #[error("Object already exists: {0}")]
    ObjectExists(String),

    /// AWS SDK error (dispatch, timeout, construction)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BucketError {
    /// Maps a failed conditional `PutObject` for `key`
    pub(crate) fn from_put_error(key: &str, error: SdkError<PutObjectError>) -> Self {
        match error {
            SdkError::ServiceError(service_err) => match service_err.raw().status().as_u16() {
                // If-None-Match: * matched an existing object
                409 | 412 => Self::ObjectExists(key.to_string()),
                status if status >= 500 => Self::UpstreamError(format!("{service_err:?}")),
                _ => Self::S3Error(format!("{:?}", service_err.err())),
            },
            other => Self::AwsError(other.to_string()),
        }
    }
}

impl From<SdkError<ListObjectsV2Error>> for BucketError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        match error {
            SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() >= 500 => {
                Self::UpstreamError(format!("{service_err:?}"))
            }
            SdkError::ServiceError(service_err) => Self::S3Error(format!("{:?}", service_err.err())),
            other => Self::AwsError(other.to_string()),
        }
    }
}
