use std::sync::Arc;

use axum::{Extension, Json};
use chrono::SecondsFormat;
use common_types::{ImageEntry, ListImagesResponse};
use tracing::instrument;

use crate::{
    media_storage::{object_key, MediaStorage, StoredObject},
    middleware::AuthenticatedUser,
    types::AppError,
};

/// Most images returned by one listing
pub const LIST_LIMIT: usize = 100;

/// Lists the caller's images, newest first
///
/// Only objects directly under the caller's namespace are returned.
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - No valid session
/// - `500 INTERNAL_SERVER_ERROR` - Storage failure
#[instrument(skip(media_storage), fields(user_id = %user.user_id))]
pub async fn list_images(
    Extension(media_storage): Extension<Arc<dyn MediaStorage>>,
    user: AuthenticatedUser,
) -> Result<Json<ListImagesResponse>, AppError> {
    let objects = media_storage
        .list(&user.user_id, LIST_LIMIT)
        .await
        .map_err(|err| AppError::upstream(&err, "list_failed", "Failed to fetch images"))?;

    let images = objects
        .into_iter()
        .map(|object| to_image_entry(media_storage.as_ref(), &user.user_id, object))
        .collect::<Vec<_>>();

    tracing::debug!(count = images.len(), "Listed images");

    Ok(Json(ListImagesResponse { images }))
}

fn to_image_entry(
    media_storage: &dyn MediaStorage,
    namespace: &str,
    object: StoredObject,
) -> ImageEntry {
    ImageEntry {
        url: media_storage.public_url(&object_key(namespace, &object.name)),
        size: object.size,
        created_at: object
            .created_at
            .map(|created_at| created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        name: object.name,
    }
}
