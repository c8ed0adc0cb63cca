//! Typed access to the Bot Studio HTTP API

use common_types::{
    ApiErrorResponse, ListImagesResponse, SendBotConfigRequest, SendBotConfigResponse,
    UploadImageResponse,
};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Name of the multipart field the upload endpoint reads
const FILE_FIELD_NAME: &str = "file";

/// A file picked or dropped by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Original file name
    pub name: String,
    /// Declared MIME type
    pub content_type: String,
    /// File contents
    pub data: Vec<u8>,
}

impl LocalFile {
    /// Creates a file from its name, MIME type and contents
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Whether the declared MIME type is an image type
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Operations the widget and the form need from the backend
#[async_trait::async_trait]
pub trait StudioApi: Send + Sync {
    /// Lists the caller's images, newest first
    async fn list_images(&self) -> Result<ListImagesResponse, ClientError>;

    /// Uploads `file` into the caller's namespace
    async fn upload_image(&self, file: &LocalFile) -> Result<UploadImageResponse, ClientError>;

    /// Sends a bot configuration; failure envelopes are returned as `Ok`
    async fn send_bot_config(
        &self,
        request: &SendBotConfigRequest,
    ) -> Result<SendBotConfigResponse, ClientError>;
}

/// [`StudioApi`] over HTTP with an optional bearer token
#[derive(Clone)]
pub struct HttpStudioApi {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for HttpStudioApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStudioApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpStudioApi {
    /// Creates a client for the backend at `base_url`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Decodes a success body, or turns an error status into `ClientError::Api`
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorResponse>(&body)
                .ok()
                .map(|error| error.error);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl StudioApi for HttpStudioApi {
    #[tracing::instrument(skip(self))]
    async fn list_images(&self) -> Result<ListImagesResponse, ClientError> {
        let request = self.apply_auth(self.client.get(self.build_url("/api/images")));
        let response = request.send().await?;

        Self::parse(response).await
    }

    #[tracing::instrument(skip(self, file), fields(name = %file.name, size = file.data.len()))]
    async fn upload_image(&self, file: &LocalFile) -> Result<UploadImageResponse, ClientError> {
        let form = multipart::Form::new().part(FILE_FIELD_NAME, file_part(file));

        let request = self.apply_auth(self.client.post(self.build_url("/api/upload")));
        let response = request.multipart(form).send().await?;

        Self::parse(response).await
    }

    #[tracing::instrument(skip_all, fields(bot_id = %request.config.bot_id))]
    async fn send_bot_config(
        &self,
        request: &SendBotConfigRequest,
    ) -> Result<SendBotConfigResponse, ClientError> {
        let response = self
            .apply_auth(self.client.post(self.build_url("/api/bot/send")))
            .json(request)
            .send()
            .await?;

        // Rejections carry the same envelope as successes
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Multipart part for `file`, untyped when its MIME type does not parse so the
/// server still answers with its own validation message
fn file_part(file: &LocalFile) -> multipart::Part {
    let part = || multipart::Part::bytes(file.data.clone()).file_name(file.name.clone());

    part().mime_str(&file.content_type).unwrap_or_else(|err| {
        tracing::debug!(content_type = %file.content_type, error = %err, "Sending file without a MIME type");
        part()
    })
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Scriptable in-process [`StudioApi`]

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use common_types::{
        ImageEntry, ListImagesResponse, SendBotConfigRequest, SendBotConfigResponse,
        SentBotConfig, UploadImageResponse, BOT_CONFIG_MISSING_FIELDS_MESSAGE,
        BOT_CONFIG_SENT_MESSAGE,
    };
    use tokio::sync::{RwLock, Semaphore};

    use super::{LocalFile, StudioApi};
    use crate::error::ClientError;

    /// Base URL of images "stored" by [`MockStudioApi`]
    pub const MOCK_BASE_URL: &str = "http://mock.test/images";

    /// Namespace of every upload made through [`MockStudioApi`]
    pub const MOCK_USER_ID: &str = "mock-user";

    /// In-memory backend double
    ///
    /// Uploads succeed unless an error was queued with
    /// [`MockStudioApi::queue_upload_error`]. The bot endpoint validates
    /// required fields like the real one.
    #[derive(Default)]
    pub struct MockStudioApi {
        images: RwLock<Vec<ImageEntry>>,
        upload_errors: RwLock<VecDeque<(u16, Option<String>)>>,
        uploaded: RwLock<Vec<LocalFile>>,
        bot_requests: RwLock<Vec<SendBotConfigRequest>>,
        upload_gate: Option<Arc<Semaphore>>,
        latency: Option<Duration>,
        fail_listing: AtomicBool,
        fail_bot: AtomicBool,
        list_calls: AtomicUsize,
        upload_counter: AtomicUsize,
    }

    impl MockStudioApi {
        /// Creates an empty mock
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Mock whose listing returns `images`
        #[must_use]
        pub fn with_images(images: Vec<ImageEntry>) -> Self {
            Self {
                images: RwLock::new(images),
                ..Self::default()
            }
        }

        /// Makes every upload wait for a permit of `gate`
        #[must_use]
        pub fn with_upload_gate(mut self, gate: Arc<Semaphore>) -> Self {
            self.upload_gate = Some(gate);
            self
        }

        /// Delays every response by `latency`
        #[must_use]
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Fails the next upload with `status` and the server error `message`
        pub async fn queue_upload_error(&self, status: u16, message: Option<&str>) {
            self.upload_errors
                .write()
                .await
                .push_back((status, message.map(ToString::to_string)));
        }

        /// Makes listings fail with a server error
        pub fn set_fail_listing(&self, fail: bool) {
            self.fail_listing.store(fail, Ordering::SeqCst);
        }

        /// Makes bot sends fail with an unreadable response
        pub fn set_fail_bot(&self, fail: bool) {
            self.fail_bot.store(fail, Ordering::SeqCst);
        }

        /// Number of listings requested
        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        /// Files received by successful uploads, in order
        pub async fn uploaded(&self) -> Vec<LocalFile> {
            self.uploaded.read().await.clone()
        }

        /// Bot configuration requests received, in order
        pub async fn bot_requests(&self) -> Vec<SendBotConfigRequest> {
            self.bot_requests.read().await.clone()
        }

        async fn simulate_latency(&self) {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
        }
    }

    #[async_trait::async_trait]
    impl StudioApi for MockStudioApi {
        async fn list_images(&self) -> Result<ListImagesResponse, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 500,
                    message: Some("Failed to fetch images".to_string()),
                });
            }

            Ok(ListImagesResponse {
                images: self.images.read().await.clone(),
            })
        }

        async fn upload_image(&self, file: &LocalFile) -> Result<UploadImageResponse, ClientError> {
            if let Some(gate) = &self.upload_gate {
                // A closed gate lets every upload through
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            self.simulate_latency().await;

            if let Some((status, message)) = self.upload_errors.write().await.pop_front() {
                return Err(ClientError::Api { status, message });
            }

            let n = self.upload_counter.fetch_add(1, Ordering::SeqCst);
            let name = format!("{n}-{}", file.name);
            let file_name = format!("{MOCK_USER_ID}/{name}");
            let url = format!("{MOCK_BASE_URL}/{file_name}");

            self.images.write().await.insert(
                0,
                ImageEntry {
                    name,
                    url: url.clone(),
                    size: file.data.len() as u64,
                    created_at: None,
                },
            );
            self.uploaded.write().await.push(file.clone());

            Ok(UploadImageResponse {
                success: true,
                url,
                file_name,
            })
        }

        async fn send_bot_config(
            &self,
            request: &SendBotConfigRequest,
        ) -> Result<SendBotConfigResponse, ClientError> {
            self.bot_requests.write().await.push(request.clone());
            self.simulate_latency().await;

            if self.fail_bot.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 502,
                    message: None,
                });
            }

            let config = &request.config;
            if config.bot_id.is_empty()
                || config.knowledge_base_name.is_empty()
                || config.branding.name.is_empty()
            {
                return Ok(SendBotConfigResponse::failure(
                    BOT_CONFIG_MISSING_FIELDS_MESSAGE,
                ));
            }

            Ok(SendBotConfigResponse {
                success: true,
                message: BOT_CONFIG_SENT_MESSAGE.to_string(),
                data: Some(SentBotConfig {
                    bot_id: config.bot_id.clone(),
                    knowledge_base_name: config.knowledge_base_name.clone(),
                    sent_at: chrono::Utc::now()
                        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                }),
            })
        }
    }
}
