use super::{
    env::{self, EnvSource, ProcessEnv},
    exchanges::ExchangeCredentials,
    firebase::FirebaseSettings,
    overlay::{self, DEFAULT_YAML_PATH},
    research::ResearchSettings,
    telegram::TelegramSettings,
    traits::{ConfigManifest, ConfigSection},
    validation::ValidationReport,
};
use crate::error::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub const DEFAULT_DOTENV_PATH: &str = ".env";

/// Validated configuration snapshot. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    firebase: FirebaseSettings,
    telegram: TelegramSettings,
    research: ResearchSettings,
    exchanges: ExchangeCredentials,
    report: ValidationReport,
}

impl AppConfig {
    pub fn firebase(&self) -> &FirebaseSettings {
        &self.firebase
    }

    pub fn telegram(&self) -> &TelegramSettings {
        &self.telegram
    }

    pub fn research(&self) -> &ResearchSettings {
        &self.research
    }

    pub fn exchanges(&self) -> &ExchangeCredentials {
        &self.exchanges
    }

    /// Report produced when the snapshot was built.
    pub fn validation(&self) -> &ValidationReport {
        &self.report
    }

    /// True when no section has a fatal problem.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// Re-run every section validator.
    pub fn validate(&self) -> ValidationReport {
        ValidationReport::new(vec![
            self.firebase.validate(),
            self.telegram.validate(),
            self.research.validate(),
            self.exchanges.validate(),
        ])
    }

    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![
            self.firebase.to_manifest(),
            self.telegram.to_manifest(),
            self.research.to_manifest(),
            self.exchanges.to_manifest(),
        ]
    }
}

/// Where configuration is read from.
pub struct ConfigLoader {
    env: Box<dyn EnvSource>,
    yaml_path: PathBuf,
    dotenv_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Process environment, `.env` and `config.yaml` in the working directory.
    pub fn new() -> Self {
        Self {
            env: Box::new(ProcessEnv),
            yaml_path: PathBuf::from(DEFAULT_YAML_PATH),
            dotenv_path: Some(PathBuf::from(DEFAULT_DOTENV_PATH)),
        }
    }

    /// Read variables from `env` instead of the process. No `.env` file is loaded.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self.dotenv_path = None;
        self
    }

    pub fn with_yaml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.yaml_path = path.into();
        self
    }

    pub fn with_dotenv_path(mut self, path: Option<PathBuf>) -> Self {
        self.dotenv_path = path;
        self
    }

    pub fn yaml_path(&self) -> &Path {
        &self.yaml_path
    }

    /// Build a snapshot: environment, then YAML overlay, then validation.
    ///
    /// Only an environment value that fails to parse is an error. Validation
    /// problems are recorded in [`AppConfig::validation`].
    pub fn load(&self) -> Result<AppConfig> {
        if let Some(path) = &self.dotenv_path {
            env::load_dotenv(path);
        }

        let env = self.env.as_ref();
        let firebase = FirebaseSettings::from_env(env)?;
        let telegram = TelegramSettings::from_env(env)?;
        let mut research = ResearchSettings::from_env(env)?;
        let exchanges = ExchangeCredentials::from_env(env)?;

        overlay::apply_research_overlay(&mut research, &self.yaml_path);

        let mut config = AppConfig {
            firebase,
            telegram,
            research,
            exchanges,
            report: ValidationReport::default(),
        };
        config.report = config.validate();

        if config.report.is_valid() {
            log::info!(
                "Configuration loaded ({} warning(s))",
                config.report.warning_count()
            );
        } else {
            log::error!("Configuration has fatal problems:\n{}", config.report);
        }
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the configuration on first use and hands out the same snapshot afterwards.
///
/// Create one per process and pass it to whatever needs settings.
pub struct ConfigStore {
    loader: ConfigLoader,
    config: OnceLock<Arc<AppConfig>>,
    init: Mutex<()>,
}

impl ConfigStore {
    pub fn new(loader: ConfigLoader) -> Self {
        Self {
            loader,
            config: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The configuration, building it if this is the first call.
    ///
    /// Concurrent first callers block until the one building it finishes. A
    /// failed build is not cached.
    pub fn get(&self) -> Result<Arc<AppConfig>> {
        if let Some(config) = self.config.get() {
            return Ok(Arc::clone(config));
        }

        let _guard = self.init.lock();
        if let Some(config) = self.config.get() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.loader.load()?);
        // Only the lock holder sets the cell, so this cannot already be filled.
        let _ = self.config.set(Arc::clone(&config));
        Ok(config)
    }

    /// The configuration if it has been built.
    pub fn try_get(&self) -> Option<Arc<AppConfig>> {
        self.config.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.config.get().is_some()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ConfigLoader::new())
    }
}
