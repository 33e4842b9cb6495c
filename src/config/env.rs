use crate::error::{Result, TradevoError};
use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;
use std::str::FromStr;
use std::sync::Once;

static DOTENV: Once = Once::new();

/// Name to value lookup that settings are read from.
pub trait EnvSource: Send + Sync {
    /// `Ok(None)` when `key` is not set. A value that is set but unreadable
    /// is an error.
    fn get(&self, key: &str) -> Result<Option<String>>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(TradevoError::EnvParse {
                key: key.to_string(),
                value: raw.to_string_lossy().into_owned(),
                expected: "valid unicode",
            }),
        }
    }
}

/// In-memory environment, used to build configs without touching the process.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.vars.get(key).cloned())
    }
}

/// Read a string variable, falling back to `default` when it is not set.
pub fn string_or(env: &dyn EnvSource, key: &str, default: &str) -> Result<String> {
    Ok(env.get(key)?.unwrap_or_else(|| default.to_string()))
}

/// Read and parse a variable, falling back to `default` when it is not set.
///
/// A variable that is set but does not parse is an error, never a silent default.
pub fn parse_or<T: FromStr>(env: &dyn EnvSource, key: &str, default: T) -> Result<T> {
    match env.get(key)? {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| TradevoError::EnvParse {
            key: key.to_string(),
            value: raw,
            expected: std::any::type_name::<T>(),
        }),
    }
}

/// Hide a secret for logs, keeping only whether it is set.
pub(crate) fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "***"
    }
}

/// Load `path` into the process environment, once per process.
///
/// Variables that are already set keep their values. A missing file is not
/// an error.
pub fn load_dotenv(path: &Path) {
    DOTENV.call_once(|| match dotenvy::from_path(path) {
        Ok(()) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_default_when_absent() {
        let env = MapEnv::new();
        assert_eq!(string_or(&env, "FIREBASE_PROJECT_ID", "").unwrap(), "");
        assert_eq!(string_or(&env, "MISSING", "fallback").unwrap(), "fallback");
    }

    #[test]
    fn test_string_present_overrides_default() {
        let env = MapEnv::new().with("FIREBASE_PROJECT_ID", "evo-prod");
        assert_eq!(string_or(&env, "FIREBASE_PROJECT_ID", "").unwrap(), "evo-prod");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let env = MapEnv::new().with("BACKTEST_DAYS", " 90 ");
        assert_eq!(parse_or(&env, "BACKTEST_DAYS", 365i64).unwrap(), 90);
    }

    #[test]
    fn test_parse_error_names_variable() {
        let env = MapEnv::new().with("MAX_HYPOTHESES_PER_CYCLE", "five");
        let err = parse_or(&env, "MAX_HYPOTHESES_PER_CYCLE", 5i64).unwrap_err();
        match err {
            TradevoError::EnvParse { key, value, .. } => {
                assert_eq!(key, "MAX_HYPOTHESES_PER_CYCLE");
                assert_eq!(value, "five");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_value_is_not_a_number() {
        let env = MapEnv::new().with("MIN_WIN_RATE", "");
        assert!(parse_or(&env, "MIN_WIN_RATE", 0.55f64).is_err());
    }

    #[test]
    fn test_float_accepts_integer_text() {
        let env = MapEnv::new().with("MAX_DRAWDOWN", "1");
        assert_eq!(parse_or(&env, "MAX_DRAWDOWN", 0.2f64).unwrap(), 1.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_an_error() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let key = "TRADEVO_ENV_TEST_NON_UNICODE_DAYS";
        std::env::set_var(key, OsString::from_vec(vec![b'3', 0xff, b'0']));

        assert!(matches!(
            ProcessEnv.get(key),
            Err(TradevoError::EnvParse { .. })
        ));
        assert!(parse_or(&ProcessEnv, key, 365i64).is_err());
        std::env::remove_var(key);
    }

    #[test]
    fn test_process_env_absent_is_none() {
        assert!(ProcessEnv
            .get("TRADEVO_ENV_TEST_NEVER_SET")
            .unwrap()
            .is_none());
    }
}
