//! Wire types shared between the studio backend and its clients

mod bot;
mod images;

pub use bot::{
    BotBranding, BotConfiguration, ConfigField, SendBotConfigRequest, SendBotConfigResponse,
    SentBotConfig, BOT_CONFIG_FAILED_MESSAGE, BOT_CONFIG_MISSING_FIELDS_MESSAGE,
    BOT_CONFIG_SENT_MESSAGE, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
};
pub use images::{ApiErrorResponse, ImageEntry, ListImagesResponse, UploadImageResponse};
