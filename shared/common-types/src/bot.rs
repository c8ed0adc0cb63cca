use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

/// Message returned when one of the required configuration fields is empty
pub const BOT_CONFIG_MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: botId, knowledgeBaseName, or branding.name";

/// Message returned when the configuration was accepted
pub const BOT_CONFIG_SENT_MESSAGE: &str = "Bot configuration sent successfully";

/// Generic failure message, used for unexpected server errors and transport failures
pub const BOT_CONFIG_FAILED_MESSAGE: &str = "Failed to send bot configuration";

/// Primary color preselected by the configuration form
pub const DEFAULT_PRIMARY_COLOR: &str = "#000000";

/// Secondary color preselected by the configuration form
pub const DEFAULT_SECONDARY_COLOR: &str = "#ffffff";

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Visual identity of a bot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BotBranding {
    /// Display name of the brand, required
    #[serde(deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    #[validate(length(min = 1))]
    pub name: String,
    /// Logo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Primary color as a hex string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    /// Secondary color as a hex string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    /// Free-form brand description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Configuration of a bot as edited in the configuration form
///
/// Missing or `null` fields deserialize to empty values so that validation,
/// not parsing, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfiguration {
    /// Identifier of the bot
    #[serde(deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    #[validate(length(min = 1))]
    pub bot_id: String,
    /// Name of the knowledge base the bot answers from
    #[serde(deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    #[validate(length(min = 1))]
    pub knowledge_base_name: String,
    /// Branding information
    #[serde(deserialize_with = "null_as_default")]
    #[schemars(with = "BotBranding")]
    #[validate(nested)]
    pub branding: BotBranding,
}

/// A single editable field of [`BotConfiguration`]
///
/// Parses from and prints as the dotted path used by form inputs,
/// e.g. `"branding.primaryColor"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ConfigField {
    /// `botId`
    #[strum(serialize = "botId")]
    BotId,
    /// `knowledgeBaseName`
    #[strum(serialize = "knowledgeBaseName")]
    KnowledgeBaseName,
    /// `branding.name`
    #[strum(serialize = "branding.name")]
    BrandingName,
    /// `branding.logo`
    #[strum(serialize = "branding.logo")]
    BrandingLogo,
    /// `branding.primaryColor`
    #[strum(serialize = "branding.primaryColor")]
    BrandingPrimaryColor,
    /// `branding.secondaryColor`
    #[strum(serialize = "branding.secondaryColor")]
    BrandingSecondaryColor,
    /// `branding.description`
    #[strum(serialize = "branding.description")]
    BrandingDescription,
}

impl BotConfiguration {
    /// Assigns `value` to `field`
    pub fn set(&mut self, field: ConfigField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ConfigField::BotId => self.bot_id = value,
            ConfigField::KnowledgeBaseName => self.knowledge_base_name = value,
            ConfigField::BrandingName => self.branding.name = value,
            ConfigField::BrandingLogo => self.branding.logo = Some(value),
            ConfigField::BrandingPrimaryColor => self.branding.primary_color = Some(value),
            ConfigField::BrandingSecondaryColor => self.branding.secondary_color = Some(value),
            ConfigField::BrandingDescription => self.branding.description = Some(value),
        }
    }

    /// Current value of `field`, `None` for optional fields that were never set
    #[must_use]
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        match field {
            ConfigField::BotId => Some(&self.bot_id),
            ConfigField::KnowledgeBaseName => Some(&self.knowledge_base_name),
            ConfigField::BrandingName => Some(&self.branding.name),
            ConfigField::BrandingLogo => self.branding.logo.as_deref(),
            ConfigField::BrandingPrimaryColor => self.branding.primary_color.as_deref(),
            ConfigField::BrandingSecondaryColor => self.branding.secondary_color.as_deref(),
            ConfigField::BrandingDescription => self.branding.description.as_deref(),
        }
    }
}

/// Request body of `POST /api/bot/send`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct SendBotConfigRequest {
    /// The configuration being sent
    #[serde(flatten)]
    #[validate(nested)]
    pub config: BotConfiguration,
    /// ISO-8601 time at which the client submitted the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Echo of an accepted configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentBotConfig {
    /// Identifier of the bot
    pub bot_id: String,
    /// Knowledge base name
    pub knowledge_base_name: String,
    /// ISO-8601 server time at which the configuration was accepted
    pub sent_at: String,
}

/// Response envelope of `POST /api/bot/send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SendBotConfigResponse {
    /// Whether the configuration was accepted
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Present only on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SentBotConfig>,
}

impl SendBotConfigResponse {
    /// Failure envelope carrying `message`
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
