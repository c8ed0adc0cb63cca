//! Image upload widget state
//!
//! Drives uploads and the per-user image list through a [`StudioApi`]. The
//! widget owns no rendering; views read [`ImageUploadWidget::snapshot`].

use std::sync::Arc;

use common_types::{ImageEntry, UploadImageResponse};
use tokio::sync::RwLock;

use crate::{
    api::{LocalFile, StudioApi},
    format::format_file_size,
};

/// Error shown when an upload fails without a server message
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// An image shown by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Public URL
    pub url: String,
    /// Storage key for fresh uploads, object name for listed images
    pub file_name: String,
    /// Object name, only known for listed images
    pub name: Option<String>,
    /// Size in bytes, only known for listed images
    pub size: Option<u64>,
    /// Creation time, only known for listed images
    pub created_at: Option<String>,
}

impl UploadedImage {
    /// Label shown under the thumbnail
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.file_name)
    }

    /// Formatted size, `None` when unknown
    #[must_use]
    pub fn size_label(&self) -> Option<String> {
        self.size.filter(|size| *size > 0).map(format_file_size)
    }
}

impl From<UploadImageResponse> for UploadedImage {
    fn from(response: UploadImageResponse) -> Self {
        Self {
            url: response.url,
            file_name: response.file_name,
            name: None,
            size: None,
            created_at: None,
        }
    }
}

impl From<ImageEntry> for UploadedImage {
    fn from(entry: ImageEntry) -> Self {
        Self {
            url: entry.url,
            file_name: entry.name.clone(),
            name: Some(entry.name),
            size: Some(entry.size),
            created_at: entry.created_at,
        }
    }
}

/// Point-in-time view of the widget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUploadState {
    /// The image list is being fetched
    pub loading: bool,
    /// At least one upload is in flight
    pub uploading: bool,
    /// Error of the last failed upload, cleared when an upload starts
    pub error: Option<String>,
    /// Images in display order, newest first
    pub images: Vec<UploadedImage>,
}

#[derive(Debug)]
struct WidgetState {
    loading: bool,
    uploads_in_flight: usize,
    error: Option<String>,
    images: Vec<UploadedImage>,
}

/// Called with every successfully uploaded image
pub type UploadCallback = Box<dyn Fn(&UploadedImage) + Send + Sync>;

/// State machine behind the image upload widget
pub struct ImageUploadWidget {
    api: Arc<dyn StudioApi>,
    on_upload: Option<UploadCallback>,
    state: RwLock<WidgetState>,
}

impl ImageUploadWidget {
    /// Creates a widget in its loading state; call [`Self::mount`] to fetch images
    pub fn new(api: Arc<dyn StudioApi>) -> Self {
        Self {
            api,
            on_upload: None,
            state: RwLock::new(WidgetState {
                loading: true,
                uploads_in_flight: 0,
                error: None,
                images: Vec::new(),
            }),
        }
    }

    /// Registers a callback invoked after each successful upload
    #[must_use]
    pub fn on_upload(mut self, callback: impl Fn(&UploadedImage) + Send + Sync + 'static) -> Self {
        self.on_upload = Some(Box::new(callback));
        self
    }

    /// Loads the caller's images
    ///
    /// A failed listing is logged and leaves the list empty.
    pub async fn mount(&self) {
        self.state.write().await.loading = true;

        let images = match self.api.list_images().await {
            Ok(response) => response
                .images
                .into_iter()
                .map(UploadedImage::from)
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load existing images");
                Vec::new()
            }
        };

        let mut state = self.state.write().await;
        state.images = images;
        state.loading = false;
    }

    /// Uploads the file chosen in the file picker, if any
    pub async fn select_file(&self, file: Option<LocalFile>) -> Option<UploadedImage> {
        self.upload_file(file?).await
    }

    /// Uploads the first image among dropped files; other files are ignored
    pub async fn drop_files(&self, files: Vec<LocalFile>) -> Option<UploadedImage> {
        let file = files.into_iter().find(LocalFile::is_image)?;
        self.upload_file(file).await
    }

    /// Uploads `file` and prepends it to the list on success
    ///
    /// On failure the server's error message, or [`UPLOAD_FAILED_MESSAGE`],
    /// becomes the widget error.
    pub async fn upload_file(&self, file: LocalFile) -> Option<UploadedImage> {
        {
            let mut state = self.state.write().await;
            state.uploads_in_flight += 1;
            state.error = None;
        }

        let result = self.api.upload_image(&file).await;

        let mut state = self.state.write().await;
        state.uploads_in_flight -= 1;

        match result {
            Ok(response) => {
                let image = UploadedImage::from(response);
                state.images.insert(0, image.clone());
                drop(state);

                if let Some(callback) = &self.on_upload {
                    callback(&image);
                }
                Some(image)
            }
            Err(err) => {
                tracing::warn!(error = %err, file = %file.name, "Image upload failed");
                state.error = Some(
                    err.server_message()
                        .unwrap_or(UPLOAD_FAILED_MESSAGE)
                        .to_string(),
                );
                None
            }
        }
    }

    /// Hides the image at `index` if it still is `file_name`
    ///
    /// Storage is untouched, so the image comes back on the next [`Self::mount`].
    /// Returns whether an image was removed.
    pub async fn remove_image(&self, index: usize, file_name: &str) -> bool {
        let mut state = self.state.write().await;
        if state
            .images
            .get(index)
            .is_some_and(|image| image.file_name == file_name)
        {
            state.images.remove(index);
            true
        } else {
            false
        }
    }

    /// Current state for rendering
    pub async fn snapshot(&self) -> ImageUploadState {
        let state = self.state.read().await;
        ImageUploadState {
            loading: state.loading,
            uploading: state.uploads_in_flight > 0,
            error: state.error.clone(),
            images: state.images.clone(),
        }
    }
}
