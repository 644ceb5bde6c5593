//! Closed set of auditor finding categories.

use serde::Serialize;
use std::fmt;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
/// What a header finding is about. Everything but `NoPrintself` fails the run.
pub enum Category {
    WrongExclusion,
    MultipleExclusion,
    MissingHeaderGuard,
    GuardNotSet,
    GuardFilenameMismatch,
    NoClass,
    MultipleClasses,
    NoExportMacro,
    WrongExportMacro,
    MultipleIncludes,
    NonPortableInclude,
    UnnecessaryInclude,
    MissingParentInclude,
    NoTypeMacro,
    BrokenTypeMacro,
    LegacyTypeMacro,
    NoPrivateCopy,
    MultiplePrivateCopy,
    NoPrivateAssign,
    MultiplePrivateAssign,
    WeirdConstructor,
    WindowsMangling,
    NoPrintself,
}

impl Category {
    pub fn severity(self) -> Severity {
        match self {
            Category::NoPrintself => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::WrongExclusion => "wrong-exclusion",
            Category::MultipleExclusion => "multiple-exclusion",
            Category::MissingHeaderGuard => "missing-header-guard",
            Category::GuardNotSet => "guard-not-set",
            Category::GuardFilenameMismatch => "guard-filename-mismatch",
            Category::NoClass => "no-class",
            Category::MultipleClasses => "multiple-classes",
            Category::NoExportMacro => "no-export-macro",
            Category::WrongExportMacro => "wrong-export-macro",
            Category::MultipleIncludes => "multiple-includes",
            Category::NonPortableInclude => "non-portable-include",
            Category::UnnecessaryInclude => "unnecessary-include",
            Category::MissingParentInclude => "missing-parent-include",
            Category::NoTypeMacro => "no-type-macro",
            Category::BrokenTypeMacro => "broken-type-macro",
            Category::LegacyTypeMacro => "legacy-type-macro",
            Category::NoPrivateCopy => "no-private-copy",
            Category::MultiplePrivateCopy => "multiple-private-copy",
            Category::NoPrivateAssign => "no-private-assign",
            Category::MultiplePrivateAssign => "multiple-private-assign",
            Category::WeirdConstructor => "weird-constructor",
            Category::WindowsMangling => "windows-mangling",
            Category::NoPrintself => "no-printself",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_printself_is_a_warning() {
        assert_eq!(Category::NoPrintself.severity(), Severity::Warning);
        assert_eq!(Category::WindowsMangling.severity(), Severity::Error);
        assert_eq!(Category::WrongExclusion.severity(), Severity::Error);
    }

    #[test]
    fn test_display_matches_serde_name() {
        for cat in [
            Category::GuardFilenameMismatch,
            Category::MultiplePrivateAssign,
            Category::NoPrintself,
        ] {
            let json = serde_json::to_value(cat).unwrap();
            assert_eq!(json, cat.to_string());
        }
    }
}
