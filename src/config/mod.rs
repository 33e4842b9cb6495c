pub mod traits;
pub mod env;
pub mod validation;
pub mod firebase;
pub mod telegram;
pub mod research;
pub mod exchanges;
pub mod overlay;
pub mod manager;

pub use manager::{AppConfig, ConfigLoader, ConfigStore};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
pub use validation::{SectionReport, Severity, ValidationIssue, ValidationReport};
pub use firebase::FirebaseSettings;
pub use telegram::TelegramSettings;
pub use research::ResearchSettings;
pub use exchanges::{ApiCredentials, ExchangeCredentials};
