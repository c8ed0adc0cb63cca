//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationIo;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::{
    routes::api::upload::{file_too_large, UPLOAD_FAILED_CODE, UPLOAD_FAILED_MESSAGE},
    types::error::{AppError, BotConfigError},
};

/// Name of the multipart field carrying the uploaded file
pub const FILE_FIELD_NAME: &str = "file";

/// Custom JSON extractor that validates the payload
///
/// Unparseable bodies are unexpected failures, invalid payloads are missing fields.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = BotConfigError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| BotConfigError::Unexpected(err.body_text()))?;

        payload.validate().map_err(|errors| {
            tracing::debug!(?errors, "Payload validation failed");
            BotConfigError::MissingFields
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Same wire shape as Json<T>
        Json::<T>::operation_input(ctx, operation);
    }
}

/// A file received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name as sent by the client
    pub file_name: Option<String>,
    /// Declared content type
    pub content_type: Option<String>,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// Extracts the `file` field of a multipart form, `None` when absent
#[derive(OperationIo)]
pub struct FileUpload(pub Option<UploadedFile>);

impl<S> FromRequest<S> for FileUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|err| AppError::upstream(&err, UPLOAD_FAILED_CODE, UPLOAD_FAILED_MESSAGE))?;

        while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
            if field.name() != Some(FILE_FIELD_NAME) {
                continue;
            }

            let file_name = field.file_name().map(ToString::to_string);
            let content_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(map_multipart_error)?;

            return Ok(Self(Some(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            })));
        }

        Ok(Self(None))
    }
}

/// Bodies over the transport limit surface as an oversized file
fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large();
    }

    AppError::upstream(&err, UPLOAD_FAILED_CODE, UPLOAD_FAILED_MESSAGE)
}
