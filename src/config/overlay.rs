use super::research::{OverlayOutcome, ResearchSettings};
use super::traits::ConfigSection;
use crate::error::{Result, TradevoError};
use config::{Config, ConfigError, File, FileFormat, Map, Value};
use std::path::Path;

pub const DEFAULT_YAML_PATH: &str = "config.yaml";

/// Read the `research` mapping from a YAML file.
///
/// Returns `Ok(None)` when the document has no `research` key.
pub fn read_research_table(path: &Path) -> Result<Option<Map<String, Value>>> {
    let yaml_err = |e: ConfigError| TradevoError::YamlLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let document = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true))
        .build()
        .map_err(yaml_err)?;

    match document.get_table(ResearchSettings::section_name()) {
        Ok(table) => Ok(Some(table)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(yaml_err(e)),
    }
}

/// Overlay the YAML file at `path` onto `research`, if the file exists.
///
/// Load failures are logged and leave `research` untouched. Returns the number
/// of fields that were applied.
pub fn apply_research_overlay(research: &mut ResearchSettings, path: &Path) -> usize {
    if !path.exists() {
        log::debug!("No YAML config at {}", path.display());
        return 0;
    }

    let table = match read_research_table(path) {
        Ok(Some(table)) => table,
        Ok(None) => {
            log::debug!("{} has no research section", path.display());
            return 0;
        }
        Err(e) => {
            log::error!("{}", e);
            return 0;
        }
    };

    let applied = table
        .into_iter()
        .filter(|(key, value)| {
            research.apply_overlay(key, value.clone()) == OverlayOutcome::Applied
        })
        .count();

    log::info!("Applied {} research setting(s) from {}", applied, path.display());
    applied
}
