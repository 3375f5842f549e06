//! Non-fatal issues collected while a design is evaluated.
//!
//! Fatal problems abort the pipeline through [`crate::MrcError`]. Everything
//! else (accounts dropped by an optional-variable gate, rows whose FOAK to
//! NOAK multiplier could not be resolved) is recorded here and emitted with
//! the report so the caller can see what was left out.
//!
//! # Example
//!
//! ```
//! use mrc_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("learning-curve", "unrecognized multiplier type", "221");
//! diag.add_info_with_entity("filter", "dropped: Reactor Type != GCMR", "222.5");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.info_count(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Category used for rows removed by the account filter.
pub const CATEGORY_FILTER: &str = "filter";
/// Category used for rows with no parent one level up.
pub const CATEGORY_HIERARCHY: &str = "hierarchy";
/// Category used for unresolved FOAK to NOAK multipliers.
pub const CATEGORY_LEARNING: &str = "learning-curve";

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Traceability only (e.g. an account dropped by design choice)
    Info,
    /// A value could not be computed but the run continued
    Warning,
}

/// A single diagnostic issue encountered during an evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "filter", "learning-curve")
    pub category: String,
    pub message: String,
    /// Optional account reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " (account {})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_info_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Info, category, message).with_entity(entity));
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Info)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn summary(&self) -> String {
        let infos = self.info_count();
        let warnings = self.warning_count();
        let plural = |n: usize| if n == 1 { "" } else { "s" };

        match (infos, warnings) {
            (0, 0) => "No issues".to_string(),
            (i, 0) => format!("{} note{}", i, plural(i)),
            (0, w) => format!("{} warning{}", w, plural(w)),
            (i, w) => format!("{} note{}, {} warning{}", i, plural(i), w, plural(w)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        diag.add_info_with_entity(CATEGORY_FILTER, "dropped", "212A");
        diag.add_warning(CATEGORY_LEARNING, "no tag");
        diag.add_warning_with_entity(CATEGORY_LEARNING, "unknown tag", "221");

        assert_eq!(diag.info_count(), 1);
        assert_eq!(diag.warning_count(), 2);
        assert!(diag.has_issues());
        assert!(diag.has_warnings());
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_warning_with_entity(CATEGORY_LEARNING, "unknown tag", "221");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"entity\": \"221\""));
    }

    #[test]
    fn test_diagnostic_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Warning, CATEGORY_LEARNING, "unknown tag")
            .with_entity("221");

        let display = format!("{}", issue);
        assert!(display.contains("warning"));
        assert!(display.contains("learning-curve"));
        assert!(display.contains("account 221"));
    }

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning(CATEGORY_LEARNING, "warning");
        assert_eq!(diag.summary(), "1 warning");

        diag.add_info_with_entity(CATEGORY_FILTER, "dropped", "13");
        assert_eq!(diag.summary(), "1 note, 1 warning");

        diag.add_warning(CATEGORY_LEARNING, "another warning");
        assert_eq!(diag.summary(), "1 note, 2 warnings");
    }

    #[test]
    fn test_issues_by_category_and_merge() {
        let mut diag1 = Diagnostics::new();
        diag1.add_info_with_entity(CATEGORY_FILTER, "dropped", "13");

        let mut diag2 = Diagnostics::new();
        diag2.add_warning(CATEGORY_LEARNING, "no tag");

        diag1.merge(diag2);
        assert_eq!(diag1.issues_by_category(CATEGORY_FILTER).count(), 1);
        assert_eq!(diag1.issues_by_category(CATEGORY_LEARNING).count(), 1);
    }
}
