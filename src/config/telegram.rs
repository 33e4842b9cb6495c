use super::env::{mask, string_or, EnvSource};
use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use super::validation::{SectionReport, ValidationIssue};
use crate::error::Result;
use std::fmt;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Placeholder values shipped in the sample `.env`.
pub const BOT_TOKEN_PLACEHOLDER: &str = "your_bot_token_here";
pub const CHAT_ID_PLACEHOLDER: &str = "your_chat_id_here";

#[derive(Clone, Default, PartialEq)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramSettings {
    /// Whether notifications can be sent with these settings.
    pub fn is_configured(&self) -> bool {
        is_set(&self.bot_token, BOT_TOKEN_PLACEHOLDER) && is_set(&self.chat_id, CHAT_ID_PLACEHOLDER)
    }
}

fn is_set(value: &str, placeholder: &str) -> bool {
    !value.is_empty() && value != placeholder
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &mask(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl ConfigSection for TelegramSettings {
    fn section_name() -> &'static str {
        "telegram"
    }

    fn from_env(env: &dyn EnvSource) -> Result<Self> {
        Ok(Self {
            bot_token: string_or(env, ENV_BOT_TOKEN, "")?,
            chat_id: string_or(env, ENV_CHAT_ID, "")?,
        })
    }

    fn validate(&self) -> SectionReport {
        let mut report = SectionReport::new(Self::section_name());
        if !is_set(&self.bot_token, BOT_TOKEN_PLACEHOLDER) {
            report.push(ValidationIssue::Placeholder { field: "bot_token" });
        }
        if !is_set(&self.chat_id, CHAT_ID_PLACEHOLDER) {
            report.push(ValidationIssue::Placeholder { field: "chat_id" });
        }
        report
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Telegram".to_string(),
            fields: vec![
                FieldManifest {
                    name: "bot_token".to_string(),
                    field_type: "secret".to_string(),
                    default: serde_json::json!(""),
                    min: None,
                    max: None,
                    env_var: Some(ENV_BOT_TOKEN.to_string()),
                    description: "Bot API token used for notifications".to_string(),
                },
                FieldManifest {
                    name: "chat_id".to_string(),
                    field_type: "string".to_string(),
                    default: serde_json::json!(""),
                    min: None,
                    max: None,
                    env_var: Some(ENV_CHAT_ID.to_string()),
                    description: "Chat that receives notifications".to_string(),
                },
            ],
        }
    }
}
