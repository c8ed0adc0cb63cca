use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use chrono::Utc;
use common_types::UploadImageResponse;
use tracing::instrument;

use crate::{
    media_storage::{object_key, MediaStorage},
    middleware::AuthenticatedUser,
    types::{AppError, FileUpload},
};

/// Largest accepted image, 5 MiB
pub const MAX_IMAGE_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Transport cap on upload request bodies, leaves room for multipart framing
pub const MAX_UPLOAD_BODY_BYTES: usize = 2 * MAX_IMAGE_SIZE_BYTES;

pub(crate) const UPLOAD_FAILED_CODE: &str = "upload_failed";
pub(crate) const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload image";

/// Longest original extension kept in storage keys
const MAX_EXTENSION_LEN: usize = 8;

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/jpeg`, also sent as `image/jpg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageFormat {
    /// Format of a declared content type; parameters are ignored and nothing is decoded
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime: mime::Mime = content_type.parse().ok()?;
        if mime.type_() != mime::IMAGE {
            return None;
        }

        match mime.subtype().as_str().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Extension used when the original file name has none
    #[must_use]
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Extension for the storage key: the original one when it is short and
/// alphanumeric, otherwise the format's default
#[must_use]
pub fn file_extension(file_name: Option<&str>, format: ImageFormat) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| extension)
        .filter(|extension| {
            (1..=MAX_EXTENSION_LEN).contains(&extension.len())
                && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(
            || format.default_extension().to_string(),
            str::to_ascii_lowercase,
        )
}

/// Storage key `<userId>/<epochMillis>.<extension>`
#[must_use]
pub fn storage_key(user_id: &str, epoch_millis: i64, extension: &str) -> String {
    object_key(user_id, &format!("{epoch_millis}.{extension}"))
}

pub(crate) const fn no_file() -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "missing_file", "No file provided")
}

pub(crate) const fn invalid_file_type() -> AppError {
    AppError::new(
        StatusCode::BAD_REQUEST,
        "invalid_file_type",
        "Invalid file type. Please upload JPEG, PNG, or WebP images.",
    )
}

pub(crate) const fn file_too_large() -> AppError {
    AppError::new(
        StatusCode::BAD_REQUEST,
        "file_too_large",
        "File too large. Maximum size is 5MB.",
    )
}

/// Uploads an image into the caller's namespace
///
/// Expects a `multipart/form-data` body with the image in the `file` field.
/// Validation happens before any storage call:
/// 1. a file must be present
/// 2. its declared content type must be JPEG, PNG or WebP
/// 3. it must not exceed 5 MiB
///
/// The object is stored under `<userId>/<epochMillis>.<ext>` and never
/// overwrites an existing one.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing file, invalid type or too large
/// - `401 UNAUTHORIZED` - No valid session
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip(media_storage, upload), fields(user_id = %user.user_id))]
pub async fn upload_image(
    Extension(media_storage): Extension<Arc<dyn MediaStorage>>,
    user: AuthenticatedUser,
    FileUpload(upload): FileUpload,
) -> Result<Json<UploadImageResponse>, AppError> {
    let file = upload.ok_or(no_file())?;

    let content_type = file.content_type.unwrap_or_default();
    let format = ImageFormat::from_content_type(&content_type).ok_or(invalid_file_type())?;

    if file.data.len() > MAX_IMAGE_SIZE_BYTES {
        return Err(file_too_large());
    }

    let extension = file_extension(file.file_name.as_deref(), format);
    let key = storage_key(&user.user_id, Utc::now().timestamp_millis(), &extension);

    let stored_key = media_storage
        .upload(&key, file.data, &content_type)
        .await
        .map_err(|err| AppError::upstream(&err, UPLOAD_FAILED_CODE, UPLOAD_FAILED_MESSAGE))?;

    let url = media_storage.public_url(&stored_key);
    tracing::info!(key = %stored_key, "Image uploaded");

    Ok(Json(UploadImageResponse {
        success: true,
        url,
        file_name: stored_key,
    }))
}
