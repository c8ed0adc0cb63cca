use std::time::Duration;

use axum::Json;
use chrono::{SecondsFormat, Utc};
use common_types::{
    SendBotConfigRequest, SendBotConfigResponse, SentBotConfig, BOT_CONFIG_SENT_MESSAGE,
};
use tracing::instrument;

use crate::types::{BotConfigError, ValidatedJson};

/// Delay standing in for the downstream bot service
pub const BOT_SEND_SIMULATED_LATENCY: Duration = Duration::from_millis(100);

/// Accepts a bot configuration
///
/// No bot service is contacted: the configuration is logged and echoed back
/// after a short simulated delay.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - `botId`, `knowledgeBaseName` or `branding.name` missing or empty
/// - `500 INTERNAL_SERVER_ERROR` - Body is not a JSON object
#[instrument(skip_all, fields(bot_id = %request.config.bot_id))]
pub async fn send_bot_config(
    ValidatedJson(request): ValidatedJson<SendBotConfigRequest>,
) -> Result<Json<SendBotConfigResponse>, BotConfigError> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let config = request.config;

    tracing::info!(
        knowledge_base_name = %config.knowledge_base_name,
        branding = ?config.branding,
        timestamp = %request.timestamp.as_deref().unwrap_or(&now),
        "Sending bot configuration"
    );

    tokio::time::sleep(BOT_SEND_SIMULATED_LATENCY).await;

    Ok(Json(SendBotConfigResponse {
        success: true,
        message: BOT_CONFIG_SENT_MESSAGE.to_string(),
        data: Some(SentBotConfig {
            bot_id: config.bot_id,
            knowledge_base_name: config.knowledge_base_name,
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    }))
}
