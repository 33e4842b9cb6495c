use super::env::{string_or, EnvSource};
use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use super::validation::{SectionReport, ValidationIssue};
use crate::error::Result;
use std::path::PathBuf;

pub const ENV_CREDENTIALS_PATH: &str = "FIREBASE_CREDENTIALS_PATH";
pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const DEFAULT_CREDENTIALS_PATH: &str = "./firebase-credentials.json";

#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseSettings {
    pub credentials_path: PathBuf,
    pub project_id: String,
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            project_id: String::new(),
        }
    }
}

impl ConfigSection for FirebaseSettings {
    fn section_name() -> &'static str {
        "firebase"
    }

    fn from_env(env: &dyn EnvSource) -> Result<Self> {
        Ok(Self {
            credentials_path: PathBuf::from(string_or(
                env,
                ENV_CREDENTIALS_PATH,
                DEFAULT_CREDENTIALS_PATH,
            )?),
            project_id: string_or(env, ENV_PROJECT_ID, "")?,
        })
    }

    fn validate(&self) -> SectionReport {
        let mut report = SectionReport::new(Self::section_name());
        if !self.credentials_path.is_file() {
            report.push(ValidationIssue::MissingFile {
                field: "credentials_path",
                path: self.credentials_path.clone(),
            });
        }
        if self.project_id.is_empty() {
            report.push(ValidationIssue::MissingField { field: "project_id" });
        }
        report
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Firebase".to_string(),
            fields: vec![
                FieldManifest {
                    name: "credentials_path".to_string(),
                    field_type: "path".to_string(),
                    default: serde_json::json!(DEFAULT_CREDENTIALS_PATH),
                    min: None,
                    max: None,
                    env_var: Some(ENV_CREDENTIALS_PATH.to_string()),
                    description: "Service account credentials file".to_string(),
                },
                FieldManifest {
                    name: "project_id".to_string(),
                    field_type: "string".to_string(),
                    default: serde_json::json!(""),
                    min: None,
                    max: None,
                    env_var: Some(ENV_PROJECT_ID.to_string()),
                    description: "Firebase project identifier".to_string(),
                },
            ],
        }
    }
}
