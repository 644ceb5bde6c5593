//! Shared data models for audit findings and reindent diagnostics.

pub mod category;
pub mod diagnostic;

pub use category::{Category, Severity};
pub use diagnostic::{Diagnostic, DiagnosticKind};

use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize, Clone, Debug)]
/// A single header finding with optional 1-based line and context lines.
pub struct Finding {
    pub file: String,
    pub line: Option<usize>,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

#[derive(Serialize, Clone, Debug, Default)]
/// Everything the auditor has to say about one header.
pub struct FileReport {
    pub file: String,
    pub excluded: bool,
    pub findings: Vec<Finding>,
}

#[derive(Serialize, Clone, Debug, Default)]
/// Categories encountered over a whole run.
pub struct Summary {
    pub errors: BTreeSet<Category>,
    pub warnings: BTreeSet<Category>,
    pub files: usize,
    pub excluded: usize,
}

impl Summary {
    pub fn record(&mut self, report: &FileReport) {
        self.files += 1;
        if report.excluded {
            self.excluded += 1;
        }
        for f in &report.findings {
            match f.severity {
                Severity::Error => self.errors.insert(f.category),
                Severity::Warning => self.warnings.insert(f.category),
            };
        }
    }

    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Serialize, Clone, Debug, Default)]
/// Audit results container.
pub struct AuditResult {
    pub reports: Vec<FileReport>,
    pub summary: Summary,
}

#[derive(Serialize, Clone, Debug, Default)]
/// What the reindenter did (or would do) to one file.
pub struct ReindentReport {
    pub file: String,
    pub skipped: bool,
    pub changed: bool,
    /// 1-based line numbers whose indentation was rewritten.
    pub changed_lines: Vec<usize>,
    pub passes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize, Clone, Debug, Default)]
/// Reindent results container.
pub struct ReindentResult {
    pub dry_run: bool,
    pub files: usize,
    pub skipped: usize,
    pub changed: usize,
    pub reports: Vec<ReindentReport>,
}

impl ReindentResult {
    pub fn record(&mut self, report: ReindentReport) {
        self.files += 1;
        if report.skipped {
            self.skipped += 1;
        }
        if report.changed {
            self.changed += 1;
        }
        self.reports.push(report);
    }

    /// Only a dry run fails, and only when some file would change.
    pub fn failed(&self) -> bool {
        self.dry_run && self.changed > 0
    }
}
