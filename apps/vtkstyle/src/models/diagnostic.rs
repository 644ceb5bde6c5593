//! Structural problems noticed while re-indenting.

use serde::Serialize;
use std::fmt;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MismatchedDelimiter,
    MismatchedIfConditional,
    UnmatchedOpenerAtEof,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::MismatchedDelimiter => "mismatched-delimiter",
            DiagnosticKind::MismatchedIfConditional => "mismatched-if-conditional",
            DiagnosticKind::UnmatchedOpenerAtEof => "unmatched-opener-at-eof",
        })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
/// Informational only; never changes the exit code.
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based; absent for whole-file problems.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}
