//! Client side of Bot Studio: a typed API client plus the state machines
//! behind the image upload widget and the bot configuration form

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// HTTP API client
pub mod api;

/// Bot configuration form
pub mod bot_config_form;

/// Client errors
pub mod error;

/// Display formatting helpers
pub mod format;

/// Image upload widget
pub mod image_upload;

pub use api::{HttpStudioApi, LocalFile, StudioApi};
pub use bot_config_form::{initial_configuration, BotConfigForm, BotConfigFormState};
pub use error::ClientError;
pub use format::format_file_size;
pub use image_upload::{ImageUploadState, ImageUploadWidget, UploadedImage, UPLOAD_FAILED_MESSAGE};
