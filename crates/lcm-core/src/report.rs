//! Migration report
//!
//! Everything a reviewer needs after a run: entity counters, the laid-out
//! forms with their bindings, and one [`Diagnostic`] per skipped binding,
//! relationship or overlap.

use crate::builder::Binding;
use chrono::{DateTime, Utc};
use lcm_entity::PersistenceReport;
use lcm_layout::{Form, LayoutReport, SnapChoice};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use ulid::Ulid;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Something was skipped or adjusted
    Warning,
    /// Something that should have migrated did not
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One reviewable finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Originating legacy plugin, if attributable
    pub plugin: Option<String>,
    /// Control, table or join the finding is about
    pub subject: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create diagnostic
    #[must_use]
    pub fn new(
        severity: Severity,
        plugin: Option<&str>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            plugin: plugin.map(str::to_string),
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Warning diagnostic
    #[inline]
    #[must_use]
    pub fn warning(plugin: Option<&str>, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, plugin, subject, message)
    }

    /// Error diagnostic
    #[inline]
    #[must_use]
    pub fn error(plugin: Option<&str>, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, plugin, subject, message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.plugin {
            Some(plugin) => write!(f, "{} [{}] {}: {}", self.severity, plugin, self.subject, self.message),
            None => write!(f, "{} {}: {}", self.severity, self.subject, self.message),
        }
    }
}

/// One migrated form
#[derive(Debug, Clone, Serialize)]
pub struct FormReport {
    /// Originating plugin
    pub plugin: String,
    /// Laid-out form
    pub form: Form,
    /// Layout counters and warnings
    pub layout: LayoutReport,
    /// Snap size chosen per surface
    pub snaps: Vec<SnapChoice>,
    /// Data bindings with their translated property paths
    pub bindings: Vec<Binding>,
}

/// Outcome of a migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Unique run id
    pub run_id: Ulid,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
    /// Entity and relationship counters
    pub persistence: PersistenceReport,
    /// Forms in migration order
    pub forms: Vec<FormReport>,
    /// Everything skipped or adjusted
    pub diagnostics: Vec<Diagnostic>,
}

impl MigrationReport {
    /// Number of diagnostics at `severity`
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// Bindings that received a property path
    #[must_use]
    pub fn translated_bindings(&self) -> usize {
        self.forms
            .iter()
            .flat_map(|f| &f.bindings)
            .filter(|b| b.property.is_some())
            .count()
    }

    /// Form by name
    #[must_use]
    pub fn form(&self, name: &str) -> Option<&FormReport> {
        self.forms.iter().find(|f| f.form.name == name)
    }

    /// Whether the run produced no warnings or errors
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.iter().all(|d| d.severity == Severity::Info)
    }
}
