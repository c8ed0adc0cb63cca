//! Bot configuration form state

use std::str::FromStr;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use common_types::{
    BotBranding, BotConfiguration, ConfigField, SendBotConfigRequest, SendBotConfigResponse,
    BOT_CONFIG_FAILED_MESSAGE, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
};
use tokio::sync::RwLock;

use crate::{api::StudioApi, error::ClientError};

/// Configuration the form starts with
#[must_use]
pub fn initial_configuration() -> BotConfiguration {
    BotConfiguration {
        bot_id: String::new(),
        knowledge_base_name: String::new(),
        branding: BotBranding {
            name: String::new(),
            logo: Some(String::new()),
            primary_color: Some(DEFAULT_PRIMARY_COLOR.to_string()),
            secondary_color: Some(DEFAULT_SECONDARY_COLOR.to_string()),
            description: Some(String::new()),
        },
    }
}

/// Point-in-time view of the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfigFormState {
    /// Values currently entered
    pub config: BotConfiguration,
    /// A submit is outstanding
    pub is_loading: bool,
    /// Outcome of the last submit, cleared when a new one starts
    pub response: Option<SendBotConfigResponse>,
}

/// State machine behind the bot configuration form
pub struct BotConfigForm {
    api: Arc<dyn StudioApi>,
    state: RwLock<BotConfigFormState>,
}

impl BotConfigForm {
    /// Creates a form holding [`initial_configuration`]
    pub fn new(api: Arc<dyn StudioApi>) -> Self {
        Self {
            api,
            state: RwLock::new(BotConfigFormState {
                config: initial_configuration(),
                is_loading: false,
                response: None,
            }),
        }
    }

    /// Sets one field of the configuration
    pub async fn set(&self, field: ConfigField, value: impl Into<String>) {
        self.state.write().await.config.set(field, value);
    }

    /// Sets the field named by an input path such as `"branding.primaryColor"`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnknownField` if `path` names no field
    pub async fn set_path(&self, path: &str, value: impl Into<String>) -> Result<(), ClientError> {
        let field =
            ConfigField::from_str(path).map_err(|_| ClientError::UnknownField(path.to_string()))?;
        self.set(field, value).await;
        Ok(())
    }

    /// Sends the current configuration, stamped with the current time
    ///
    /// Returns `None` without sending while another submit is outstanding.
    /// A request that fails before a response envelope arrives is recorded as
    /// a local failure envelope.
    pub async fn submit(&self) -> Option<SendBotConfigResponse> {
        let request = {
            let mut state = self.state.write().await;
            if state.is_loading {
                return None;
            }
            state.is_loading = true;
            state.response = None;

            SendBotConfigRequest {
                config: state.config.clone(),
                timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            }
        };

        let response = match self.api.send_bot_config(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "Failed to send bot configuration");
                SendBotConfigResponse::failure(BOT_CONFIG_FAILED_MESSAGE)
            }
        };

        let mut state = self.state.write().await;
        state.is_loading = false;
        state.response = Some(response.clone());
        Some(response)
    }

    /// Current state for rendering
    pub async fn snapshot(&self) -> BotConfigFormState {
        self.state.read().await.clone()
    }
}
