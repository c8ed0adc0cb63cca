use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    identity::IdentityProvider,
    jwt::JwtManager,
    media_storage::{mock::InMemoryMediaStorage, MediaStorage},
    server,
    types::Environment,
};
use tower::ServiceExt;

use super::utils::{multipart_body, MultipartPart, BOUNDARY};

/// Secret shared by the test identity provider and the backend
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-at-least-32-characters";

/// Audience stamped on test tokens
pub const TEST_JWT_AUDIENCE: &str = "authenticated";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Backend router wired to in-memory storage and an HS256 verifier
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub media_storage: Arc<InMemoryMediaStorage>,
    pub jwt_manager: JwtManager,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development {
            disable_auth: false,
        })
    }

    pub fn with_environment(environment: Environment) -> Self {
        setup_test_env();

        let media_storage = Arc::new(InMemoryMediaStorage::new());
        let jwt_manager =
            JwtManager::with_secret(TEST_JWT_SECRET, Some(TEST_JWT_AUDIENCE.to_string()));

        let router = server::router(
            environment.clone(),
            media_storage.clone() as Arc<dyn MediaStorage>,
            Arc::new(jwt_manager.clone()) as Arc<dyn IdentityProvider>,
        );

        Self {
            router,
            environment,
            media_storage,
            jwt_manager,
        }
    }

    /// Access token for `user_id`, valid for an hour
    pub fn token_for(&self, user_id: &str) -> String {
        self.jwt_manager
            .issue_token(user_id, Duration::from_secs(3600))
            .expect("Failed to issue token")
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, payload.to_string()).await
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: String,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
        token: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut request = Request::builder().uri(route).method("GET");
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty())?)
            .await?;
        Ok(response)
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        token: Option<&str>,
        parts: &[MultipartPart],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut request = Request::builder()
            .uri(route)
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(multipart_body(parts)))?)
            .await?;
        Ok(response)
    }

    /// Uploads one image as `user_id`
    pub async fn upload_as(
        &self,
        user_id: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Response {
        let token = self.token_for(user_id);
        self.send_multipart_request(
            "/api/upload",
            Some(&token),
            &[MultipartPart::file(file_name, content_type, data)],
        )
        .await
        .expect("Failed to send request")
    }
}
