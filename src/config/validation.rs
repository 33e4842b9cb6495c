use crate::error::TradevoError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks startup of the subsystem that owns the section.
    Fatal,
    /// Logged, startup continues with reduced capability.
    Warning,
}

/// A single problem found while validating a settings section.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("{field}: file not found at {path:?}")]
    MissingFile { field: &'static str, path: PathBuf },

    #[error("{field} is not configured")]
    MissingField { field: &'static str },

    #[error("{field} is empty or still set to its placeholder")]
    Placeholder { field: &'static str },

    #[error("{field} must be positive, got {value}")]
    InvalidRange { field: &'static str, value: i64 },

    #[error("{field}: {reason}")]
    SuspiciousValue { field: &'static str, reason: String },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingFile { .. } | Self::MissingField { .. } | Self::InvalidRange { .. } => {
                Severity::Fatal
            }
            Self::Placeholder { .. } | Self::SuspiciousValue { .. } => Severity::Warning,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Invalid numeric ranges stop the process. Missing resources only leave
    /// their section unready.
    pub fn blocks_startup(&self) -> bool {
        matches!(self, Self::InvalidRange { .. })
    }
}

/// Issues collected for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    section: &'static str,
    issues: Vec<ValidationIssue>,
}

impl SectionReport {
    pub fn new(section: &'static str) -> Self {
        Self {
            section,
            issues: Vec::new(),
        }
    }

    /// Record an issue and log it at the level matching its severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity() {
            Severity::Fatal => log::error!("[{}] {}", self.section, issue),
            Severity::Warning => log::warn!("[{}] {}", self.section, issue),
        }
        self.issues.push(issue);
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// True when no fatal issue was recorded. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_fatal)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_fatal())
    }

    pub fn fatal(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_fatal())
    }
}

/// Result of validating every section of an [`AppConfig`](super::AppConfig).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    sections: Vec<SectionReport>,
}

impl ValidationReport {
    pub fn new(sections: Vec<SectionReport>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionReport] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section == name)
    }

    /// Logical AND of every section's fatal checks.
    pub fn is_valid(&self) -> bool {
        self.sections.iter().all(SectionReport::is_valid)
    }

    pub fn warning_count(&self) -> usize {
        self.sections.iter().map(|s| s.warnings().count()).sum()
    }

    /// Sections with a fatal issue. The process can still run without them.
    pub fn unready_sections(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections.iter().filter(|s| !s.is_valid()).map(|s| s.section)
    }

    /// True unless an issue forbids starting the process at all.
    pub fn can_start(&self) -> bool {
        !self.issues().any(|(_, i)| i.blocks_startup())
    }

    /// Error listing every fatal issue, for callers that need all sections ready.
    pub fn into_result(self) -> Result<(), TradevoError> {
        self.error_for(ValidationIssue::is_fatal)
    }

    /// Error listing the issues that forbid starting the process.
    pub fn startup_check(&self) -> Result<(), TradevoError> {
        self.error_for(ValidationIssue::blocks_startup)
    }

    fn issues(&self) -> impl Iterator<Item = (&'static str, &ValidationIssue)> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.issues.iter().map(move |i| (s.section, i)))
    }

    fn error_for(&self, select: fn(&ValidationIssue) -> bool) -> Result<(), TradevoError> {
        let problems: Vec<String> = self
            .issues()
            .filter(|(_, i)| select(i))
            .map(|(section, i)| format!("[{}] {}", section, i))
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(TradevoError::Validation(problems.join("; ")))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            let status = if !section.is_valid() {
                "invalid"
            } else if section.issues.is_empty() {
                "ok"
            } else {
                "warnings"
            };
            writeln!(f, "{}: {}", section.section, status)?;
            for issue in &section.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }
        Ok(())
    }
}
