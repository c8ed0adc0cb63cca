mod environment;
mod error;
mod extractors;

pub use environment::Environment;
pub use error::{AppError, BotConfigError};
pub use extractors::{FileUpload, UploadedFile, ValidatedJson, FILE_FIELD_NAME};
