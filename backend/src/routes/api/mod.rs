/// Bot configuration endpoint
pub mod bot;
/// Image listing endpoint
pub mod images;
/// Image upload endpoint
pub mod upload;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::auth_middleware;

/// Creates the `/api` router with all handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new().api_route("/api/bot/send", post(bot::send_bot_config));

    let protected_routes = ApiRouter::new()
        .api_route("/api/images", get(images::list_images))
        .api_route("/api/upload", post(upload::upload_image))
        .layer(middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}
