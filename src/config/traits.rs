use super::env::EnvSource;
use super::validation::SectionReport;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Sized + Clone {
    fn section_name() -> &'static str;

    /// Build the section from environment variables and their defaults.
    fn from_env(env: &dyn EnvSource) -> Result<Self>;

    /// Check the section. Problems are reported, never returned as errors.
    fn validate(&self) -> SectionReport;

    fn to_manifest(&self) -> ConfigManifest;
}

/// Description of a section's fields, their sources and defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigManifest {
    pub section: String,
    pub fields: Vec<FieldManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    pub field_type: String,
    pub default: serde_json::Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub env_var: Option<String>,
    pub description: String,
}

impl ConfigManifest {
    pub fn field(&self, name: &str) -> Option<&FieldManifest> {
        self.fields.iter().find(|f| f.name == name)
    }
}
