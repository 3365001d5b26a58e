//! Validation findings and the scored report.

use serde::Serialize;
use std::fmt;

use crate::config::ScoringPolicy;
use crate::constants::MAX_SCORE;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks validity
    Error,
    /// Informational, lowers the score only
    Warning,
}

/// Which pass produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Pass 1: required-ness, type and format, length and range
    Field,
    /// Pass 2: caller-supplied rules
    BusinessRule,
    /// Pass 3: dependency integrity, presence, row limits, template defects
    Structural,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Severity
    pub severity: Severity,
    /// Producing pass
    pub category: IssueCategory,
    /// Field concerned, when the finding is about one field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    /// Document location (rows as `table[n]/path`); empty for template-wide findings
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create an error.
    pub fn error(
        category: IssueCategory,
        field_id: Option<&str>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Error, category, field_id, path, message)
    }

    /// Create a warning.
    pub fn warning(
        category: IssueCategory,
        field_id: Option<&str>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, category, field_id, path, message)
    }

    /// Create a finding.
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        field_id: Option<&str>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            field_id: field_id.map(ToString::to_string),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the finding blocks validity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.path.is_empty() {
            write!(f, "{label}: {}", self.message)
        } else {
            write!(f, "{label} [{}]: {}", self.path, self.message)
        }
    }
}

/// Accumulated findings of one validation run.
///
/// Findings are grouped by the pass that produced them and kept in the order
/// they were found. Validity and score are derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Pass 1 findings
    pub field_issues: Vec<Issue>,
    /// Pass 2 findings
    pub rule_issues: Vec<Issue>,
    /// Pass 3 findings
    pub structural_issues: Vec<Issue>,
}

impl ValidationReport {
    /// Record a finding in the list matching its category.
    pub fn push(&mut self, issue: Issue) {
        match issue.category {
            IssueCategory::Field => self.field_issues.push(issue),
            IssueCategory::BusinessRule => self.rule_issues.push(issue),
            IssueCategory::Structural => self.structural_issues.push(issue),
        }
    }

    /// Record several findings.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    /// All findings in pass order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.field_issues.iter().chain(&self.rule_issues).chain(&self.structural_issues)
    }

    /// All errors in pass order.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues().filter(|issue| issue.severity == Severity::Error)
    }

    /// All warnings in pass order.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues().filter(|issue| issue.severity == Severity::Warning)
    }

    /// Number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Findings about one field.
    pub fn issues_for<'a>(&'a self, field_id: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues().filter(move |issue| issue.field_id.as_deref() == Some(field_id))
    }

    /// `true` when no pass produced an error. Warnings never block validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Score from 0 to 100.
    ///
    /// Each error and warning deducts its policy weight from 100, flooring at
    /// 0, so adding a finding never raises the score.
    #[must_use]
    pub fn score(&self, policy: &ScoringPolicy) -> u32 {
        let errors = u32::try_from(self.error_count()).unwrap_or(u32::MAX);
        let warnings = u32::try_from(self.warning_count()).unwrap_or(u32::MAX);
        MAX_SCORE
            .saturating_sub(errors.saturating_mul(policy.error_weight))
            .saturating_sub(warnings.saturating_mul(policy.warning_weight))
    }
}
