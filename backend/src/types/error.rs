//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common_types::{ApiErrorResponse, SendBotConfigResponse, BOT_CONFIG_FAILED_MESSAGE};

/// Application error returned by the image endpoints
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// The caller has no valid session
    #[must_use]
    pub const fn unauthorized(code: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, "Unauthorized")
    }

    /// Logs `err` with full detail and hides it behind a generic message
    #[must_use]
    pub fn upstream(
        err: &impl std::error::Error,
        code: &'static str,
        message: &'static str,
    ) -> Self {
        tracing::error!(error = %err, "{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.code, self.message),
            500..=599 => tracing::error!("Server error: {} - {}", self.code, self.message),
            _ => {}
        }

        let body = ApiErrorResponse {
            error: self.message.to_string(),
            code: self.code.to_string(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

/// Failure of `POST /api/bot/send`, rendered as a `success: false` envelope
#[derive(Debug)]
pub enum BotConfigError {
    /// A required field is missing or empty
    MissingFields,
    /// The body could not be read or processed
    Unexpected(String),
}

impl IntoResponse for BotConfigError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingFields => {
                tracing::warn!("Bot configuration rejected: missing required fields");
                (
                    StatusCode::BAD_REQUEST,
                    common_types::BOT_CONFIG_MISSING_FIELDS_MESSAGE,
                )
            }
            Self::Unexpected(detail) => {
                tracing::error!(error = %detail, "Error sending bot configuration");
                (StatusCode::INTERNAL_SERVER_ERROR, BOT_CONFIG_FAILED_MESSAGE)
            }
        };

        (status, Json(SendBotConfigResponse::failure(message))).into_response()
    }
}

impl OperationOutput for BotConfigError {
    type Inner = SendBotConfigResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<SendBotConfigResponse>::operation_response(ctx, operation)
    }
}
