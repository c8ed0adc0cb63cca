use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    identity::IdentityProvider,
    media_storage::is_valid_namespace,
    types::{AppError, Environment},
};

/// Authenticated caller, resolved by [`auth_middleware`]
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// User id, also the storage namespace of the caller's images
    pub user_id: String,
}

/// Axum extractor for the authenticated user
///
/// Use this in handlers behind [`auth_middleware`]:
/// ```ignore
/// async fn protected_handler(user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
///     Ok(user.user_id)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("missing_auth"))
    }
}

/// Session authentication middleware
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Resolves it to a user id through the `IdentityProvider`
/// 3. Adds `AuthenticatedUser` to request extensions
/// 4. Returns 401 for invalid/missing tokens
///
/// In development, `DISABLE_AUTH` makes the token itself the user id.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(identity_provider): Extension<Arc<dyn IdentityProvider>>,
    Extension(environment): Extension<Environment>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let stripped_auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    // If auth is disabled, we skip token validation
    // and use the token as the user id
    if environment.disable_auth() {
        if let Some(token) = stripped_auth_header.filter(|token| is_valid_namespace(token)) {
            let authenticated_user = AuthenticatedUser {
                user_id: token.to_string(),
            };
            request.extensions_mut().insert(authenticated_user);
        }

        return Ok(next.run(request).await);
    }

    let token = stripped_auth_header.ok_or_else(|| AppError::unauthorized("missing_token"))?;

    let user_id = identity_provider
        .resolve_user_id(token)
        .await
        .filter(|user_id| is_valid_namespace(user_id))
        .ok_or_else(|| AppError::unauthorized("invalid_token"))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
