use super::env::{mask, string_or, EnvSource};
use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use super::validation::SectionReport;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;

/// Exchanges read from the environment, with their variable prefix.
pub const SUPPORTED_EXCHANGES: &[(&str, &str)] =
    &[("binance", "BINANCE"), ("coinbase", "COINBASE")];

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &mask(&self.api_secret))
            .finish()
    }
}

fn key_var(prefix: &str) -> String {
    format!("{}_API_KEY", prefix)
}

fn secret_var(prefix: &str) -> String {
    format!("{}_API_SECRET", prefix)
}

/// API credentials keyed by exchange name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeCredentials {
    exchanges: BTreeMap<String, ApiCredentials>,
}

impl ExchangeCredentials {
    pub fn get(&self, exchange: &str) -> Option<&ApiCredentials> {
        self.exchanges.get(exchange)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiCredentials)> {
        self.exchanges.iter().map(|(name, creds)| (name.as_str(), creds))
    }

    /// Names of exchanges with both a key and a secret.
    pub fn configured(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, creds)| creds.is_configured())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl ConfigSection for ExchangeCredentials {
    fn section_name() -> &'static str {
        "exchanges"
    }

    fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let exchanges: BTreeMap<String, ApiCredentials> = SUPPORTED_EXCHANGES
            .iter()
            .map(|(name, prefix)| {
                let creds = ApiCredentials {
                    api_key: string_or(env, &key_var(prefix), "")?,
                    api_secret: string_or(env, &secret_var(prefix), "")?,
                };
                Ok((name.to_string(), creds))
            })
            .collect::<Result<_>>()?;
        Ok(Self { exchanges })
    }

    fn validate(&self) -> SectionReport {
        // Credentials are optional per exchange.
        SectionReport::new(Self::section_name())
    }

    fn to_manifest(&self) -> ConfigManifest {
        let fields = SUPPORTED_EXCHANGES
            .iter()
            .flat_map(|(name, prefix)| {
                [
                    FieldManifest {
                        name: format!("{}.api_key", name),
                        field_type: "secret".to_string(),
                        default: serde_json::json!(""),
                        min: None,
                        max: None,
                        env_var: Some(key_var(prefix)),
                        description: format!("{} API key", name),
                    },
                    FieldManifest {
                        name: format!("{}.api_secret", name),
                        field_type: "secret".to_string(),
                        default: serde_json::json!(""),
                        min: None,
                        max: None,
                        env_var: Some(secret_var(prefix)),
                        description: format!("{} API secret", name),
                    },
                ]
            })
            .collect();

        ConfigManifest {
            section: "Exchanges".to_string(),
            fields,
        }
    }
}
