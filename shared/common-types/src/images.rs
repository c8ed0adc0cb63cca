use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A stored image as returned by `GET /api/images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Object name inside the caller's namespace, e.g. `1718000000000.png`
    pub name: String,
    /// Public URL of the object
    pub url: String,
    /// Size in bytes, `0` when the storage did not report one
    #[serde(default)]
    pub size: u64,
    /// ISO-8601 creation time, when known
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response body of `GET /api/images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ListImagesResponse {
    /// Newest first
    pub images: Vec<ImageEntry>,
}

/// Response body of a successful `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    /// Always `true`
    pub success: bool,
    /// Public URL of the uploaded object
    pub url: String,
    /// Full storage key, `<userId>/<epochMillis>.<ext>`
    pub file_name: String,
}

/// Error body of the image endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable message, safe to show to the user
    pub error: String,
    /// Machine-readable error code
    pub code: String,
}
