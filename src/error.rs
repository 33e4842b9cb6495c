use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradevoError {
    #[error("Invalid value for {key}: expected {expected}, got {value:?}")]
    EnvParse {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to load YAML config at {path}: {reason}")]
    YamlLoad { path: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, TradevoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_message_names_variable() {
        let err = TradevoError::EnvParse {
            key: "BACKTEST_DAYS".to_string(),
            value: "a year".to_string(),
            expected: "i64",
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for BACKTEST_DAYS: expected i64, got \"a year\""
        );
    }

    #[test]
    fn test_yaml_load_message_includes_path() {
        let err = TradevoError::YamlLoad {
            path: "config.yaml".to_string(),
            reason: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("config.yaml"));
    }
}
