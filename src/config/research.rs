use super::env::{parse_or, EnvSource};
use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use super::validation::{SectionReport, ValidationIssue};
use crate::error::Result;
use config::{Value, ValueKind};

pub const ENV_MAX_HYPOTHESES_PER_CYCLE: &str = "MAX_HYPOTHESES_PER_CYCLE";
pub const ENV_BACKTEST_DAYS: &str = "BACKTEST_DAYS";
pub const ENV_MIN_WIN_RATE: &str = "MIN_WIN_RATE";
pub const ENV_MAX_DRAWDOWN: &str = "MAX_DRAWDOWN";

/// Shorter backtests are allowed but give unreliable statistics.
pub const MIN_RELIABLE_BACKTEST_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSettings {
    pub max_hypotheses_per_cycle: i64,
    pub backtest_days: i64,
    pub min_win_rate: f64,
    pub max_drawdown: f64,
    pub data_cache_hours: i64,
    pub confidence_threshold: f64,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_hypotheses_per_cycle: 5,
            backtest_days: 365,
            min_win_rate: 0.55,
            max_drawdown: 0.2,
            data_cache_hours: 1,
            confidence_threshold: 0.7,
        }
    }
}

/// Mutable view of one overlayable field, tagged with the type it accepts.
enum Slot<'a> {
    Int(&'a mut i64),
    Float(&'a mut f64),
}

type Accessor = fn(&mut ResearchSettings) -> Slot<'_>;

/// Fields that a YAML `research` mapping may set. Anything else is ignored.
const OVERLAY_FIELDS: &[(&str, Accessor)] = &[
    ("max_hypotheses_per_cycle", max_hypotheses_per_cycle),
    ("backtest_days", backtest_days),
    ("min_win_rate", min_win_rate),
    ("max_drawdown", max_drawdown),
    ("data_cache_hours", data_cache_hours),
    ("confidence_threshold", confidence_threshold),
];

fn max_hypotheses_per_cycle(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Int(&mut s.max_hypotheses_per_cycle)
}

fn backtest_days(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Int(&mut s.backtest_days)
}

fn min_win_rate(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Float(&mut s.min_win_rate)
}

fn max_drawdown(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Float(&mut s.max_drawdown)
}

fn data_cache_hours(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Int(&mut s.data_cache_hours)
}

fn confidence_threshold(s: &mut ResearchSettings) -> Slot<'_> {
    Slot::Float(&mut s.confidence_threshold)
}

/// Integer without conversion: floats, bools and strings are rejected.
fn integer(value: &Value) -> Option<i64> {
    match value.kind {
        ValueKind::I64(n) => Some(n),
        ValueKind::I128(n) => i64::try_from(n).ok(),
        ValueKind::U64(n) => i64::try_from(n).ok(),
        _ => None,
    }
}

/// Float or integer. Bools and strings are rejected.
fn float(value: &Value) -> Option<f64> {
    match value.kind {
        ValueKind::Float(x) => Some(x),
        _ => integer(value).map(|n| n as f64),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOutcome {
    Applied,
    UnknownField,
    Rejected,
}

impl ResearchSettings {
    /// Apply one overlay value if `key` names a known field.
    ///
    /// A value of the wrong type leaves the field unchanged.
    pub fn apply_overlay(&mut self, key: &str, value: Value) -> OverlayOutcome {
        let Some((_, accessor)) = OVERLAY_FIELDS.iter().find(|(name, _)| *name == key) else {
            log::debug!("Ignoring unknown research key '{}'", key);
            return OverlayOutcome::UnknownField;
        };
        let (expected, applied) = match accessor(self) {
            Slot::Int(field) => ("an integer", integer(&value).map(|n| *field = n).is_some()),
            Slot::Float(field) => ("a number", float(&value).map(|x| *field = x).is_some()),
        };
        if applied {
            OverlayOutcome::Applied
        } else {
            log::warn!("Ignoring research.{}: expected {}, got {}", key, expected, value);
            OverlayOutcome::Rejected
        }
    }

    pub fn overlay_fields() -> impl Iterator<Item = &'static str> {
        OVERLAY_FIELDS.iter().map(|(name, _)| *name)
    }
}

fn check_fraction(report: &mut SectionReport, field: &'static str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        report.push(ValidationIssue::SuspiciousValue {
            field,
            reason: format!("expected a fraction between 0 and 1, got {}", value),
        });
    }
}

impl ConfigSection for ResearchSettings {
    fn section_name() -> &'static str {
        "research"
    }

    fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_hypotheses_per_cycle: parse_or(
                env,
                ENV_MAX_HYPOTHESES_PER_CYCLE,
                defaults.max_hypotheses_per_cycle,
            )?,
            backtest_days: parse_or(env, ENV_BACKTEST_DAYS, defaults.backtest_days)?,
            min_win_rate: parse_or(env, ENV_MIN_WIN_RATE, defaults.min_win_rate)?,
            max_drawdown: parse_or(env, ENV_MAX_DRAWDOWN, defaults.max_drawdown)?,
            ..defaults
        })
    }

    fn validate(&self) -> SectionReport {
        let mut report = SectionReport::new(Self::section_name());
        if self.max_hypotheses_per_cycle <= 0 {
            report.push(ValidationIssue::InvalidRange {
                field: "max_hypotheses_per_cycle",
                value: self.max_hypotheses_per_cycle,
            });
        }
        if self.backtest_days < MIN_RELIABLE_BACKTEST_DAYS {
            report.push(ValidationIssue::SuspiciousValue {
                field: "backtest_days",
                reason: format!(
                    "{} days is less than {} and may lead to unreliable results",
                    self.backtest_days, MIN_RELIABLE_BACKTEST_DAYS
                ),
            });
        }
        if self.data_cache_hours < 0 {
            report.push(ValidationIssue::SuspiciousValue {
                field: "data_cache_hours",
                reason: format!("negative cache lifetime {}", self.data_cache_hours),
            });
        }
        check_fraction(&mut report, "min_win_rate", self.min_win_rate);
        check_fraction(&mut report, "max_drawdown", self.max_drawdown);
        check_fraction(&mut report, "confidence_threshold", self.confidence_threshold);
        report
    }

    fn to_manifest(&self) -> ConfigManifest {
        let defaults = Self::default();
        ConfigManifest {
            section: "Research".to_string(),
            fields: vec![
                FieldManifest {
                    name: "max_hypotheses_per_cycle".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(defaults.max_hypotheses_per_cycle),
                    min: Some(1.0),
                    max: None,
                    env_var: Some(ENV_MAX_HYPOTHESES_PER_CYCLE.to_string()),
                    description: "Hypotheses generated per research cycle".to_string(),
                },
                FieldManifest {
                    name: "backtest_days".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(defaults.backtest_days),
                    min: Some(MIN_RELIABLE_BACKTEST_DAYS as f64),
                    max: None,
                    env_var: Some(ENV_BACKTEST_DAYS.to_string()),
                    description: "History window for backtests, in days".to_string(),
                },
                FieldManifest {
                    name: "min_win_rate".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(defaults.min_win_rate),
                    min: Some(0.0),
                    max: Some(1.0),
                    env_var: Some(ENV_MIN_WIN_RATE.to_string()),
                    description: "Win rate a hypothesis must reach".to_string(),
                },
                FieldManifest {
                    name: "max_drawdown".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(defaults.max_drawdown),
                    min: Some(0.0),
                    max: Some(1.0),
                    env_var: Some(ENV_MAX_DRAWDOWN.to_string()),
                    description: "Largest tolerated drawdown".to_string(),
                },
                FieldManifest {
                    name: "data_cache_hours".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(defaults.data_cache_hours),
                    min: Some(0.0),
                    max: None,
                    env_var: None,
                    description: "Market data cache lifetime".to_string(),
                },
                FieldManifest {
                    name: "confidence_threshold".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(defaults.confidence_threshold),
                    min: Some(0.0),
                    max: Some(1.0),
                    env_var: None,
                    description: "Confidence needed to promote a hypothesis".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::MapEnv;
    use crate::error::TradevoError;

    #[test]
    fn test_defaults_from_empty_env() {
        let settings = ResearchSettings::from_env(&MapEnv::new()).unwrap();
        assert_eq!(settings, ResearchSettings::default());
        assert!(settings.validate().issues().is_empty());
    }

    #[test]
    fn test_env_values_are_parsed() {
        let env = MapEnv::new()
            .with(ENV_MAX_HYPOTHESES_PER_CYCLE, "12")
            .with(ENV_BACKTEST_DAYS, "180")
            .with(ENV_MIN_WIN_RATE, "0.6")
            .with(ENV_MAX_DRAWDOWN, "0.15");
        let settings = ResearchSettings::from_env(&env).unwrap();
        assert_eq!(settings.max_hypotheses_per_cycle, 12);
        assert_eq!(settings.backtest_days, 180);
        assert_eq!(settings.min_win_rate, 0.6);
        assert_eq!(settings.max_drawdown, 0.15);
        assert_eq!(settings.data_cache_hours, 1);
    }

    #[test]
    fn test_non_numeric_env_fails() {
        let env = MapEnv::new().with(ENV_BACKTEST_DAYS, "a year");
        let err = ResearchSettings::from_env(&env).unwrap_err();
        assert!(matches!(err, TradevoError::EnvParse { .. }));
    }

    #[test]
    fn test_non_positive_hypotheses_is_fatal() {
        for value in [0, -3] {
            let settings = ResearchSettings {
                max_hypotheses_per_cycle: value,
                ..Default::default()
            };
            assert!(!settings.validate().is_valid());
        }
    }

    #[test]
    fn test_short_backtest_is_warning() {
        let settings = ResearchSettings {
            backtest_days: 10,
            ..Default::default()
        };
        let report = settings.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_fraction_out_of_range_is_warning() {
        let settings = ResearchSettings {
            min_win_rate: 55.0,
            ..Default::default()
        };
        let report = settings.validate();
        assert!(report.is_valid());
        assert!(matches!(
            report.issues(),
            [ValidationIssue::SuspiciousValue { field: "min_win_rate", .. }]
        ));
    }

    #[test]
    fn test_overlay_known_and_unknown_fields() {
        let mut settings = ResearchSettings::default();
        assert_eq!(
            settings.apply_overlay("max_hypotheses_per_cycle", Value::from(9)),
            OverlayOutcome::Applied
        );
        assert_eq!(
            settings.apply_overlay("unknown_field", Value::from(123)),
            OverlayOutcome::UnknownField
        );
        assert_eq!(settings.max_hypotheses_per_cycle, 9);
    }

    #[test]
    fn test_overlay_float_accepts_integer() {
        let mut settings = ResearchSettings::default();
        settings.apply_overlay("max_drawdown", Value::from(1));
        assert_eq!(settings.max_drawdown, 1.0);
    }

    #[test]
    fn test_overlay_wrong_type_keeps_value() {
        let mut settings = ResearchSettings::default();
        assert_eq!(
            settings.apply_overlay("backtest_days", Value::from("a year")),
            OverlayOutcome::Rejected
        );
        assert_eq!(settings.backtest_days, 365);
    }

    #[test]
    fn test_overlay_float_not_rounded_into_integer() {
        let mut settings = ResearchSettings::default();
        assert_eq!(
            settings.apply_overlay("max_hypotheses_per_cycle", Value::from(0.4)),
            OverlayOutcome::Rejected
        );
        assert_eq!(
            settings.apply_overlay("backtest_days", Value::from(29.6)),
            OverlayOutcome::Rejected
        );
        assert_eq!(settings, ResearchSettings::default());
    }

    #[test]
    fn test_overlay_bool_rejected() {
        let mut settings = ResearchSettings::default();
        assert_eq!(
            settings.apply_overlay("min_win_rate", Value::from(true)),
            OverlayOutcome::Rejected
        );
        assert_eq!(
            settings.apply_overlay("data_cache_hours", Value::from(false)),
            OverlayOutcome::Rejected
        );
        assert_eq!(settings, ResearchSettings::default());
    }

    #[test]
    fn test_overlay_strings_rejected() {
        let mut settings = ResearchSettings::default();
        for text in ["yes", "on", "9"] {
            assert_eq!(
                settings.apply_overlay("data_cache_hours", Value::from(text)),
                OverlayOutcome::Rejected
            );
        }
        assert_eq!(
            settings.apply_overlay("confidence_threshold", Value::from("0.9")),
            OverlayOutcome::Rejected
        );
        assert_eq!(settings, ResearchSettings::default());
    }

    #[test]
    fn test_manifest_covers_overlay_fields() {
        let manifest = ResearchSettings::default().to_manifest();
        for name in ResearchSettings::overlay_fields() {
            assert!(manifest.field(name).is_some(), "missing {}", name);
        }
    }
}
