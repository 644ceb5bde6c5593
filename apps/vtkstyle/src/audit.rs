//! Header audit runner.
//!
//! Enumerates `vtk*.h` files in one directory, applies `HeaderRules` to each
//! and aggregates an `AuditResult`. Per-file analysis runs on the rayon pool;
//! reports keep the directory enumeration order.

use crate::checks::HeaderRules;
use crate::error::{Result, StyleError};
use crate::models::{AuditResult, FileReport, Summary};
use crate::utils;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// One auditor per invocation; owns its compiled rules and exclusions.
pub struct Auditor {
    rules: HeaderRules,
    exclusions: Vec<String>,
}

impl Auditor {
    pub fn new(
        export: Option<String>,
        windows_mangle: &str,
        exclusions: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            rules: HeaderRules::new(export, windows_mangle)?,
            exclusions,
        })
    }

    fn is_excluded(&self, name: &str, path: &Path) -> bool {
        self.exclusions
            .iter()
            .any(|e| e == name || Path::new(e) == path)
    }

    /// Headers to audit, in the order the OS lists them.
    ///
    /// Skips names not matching `vtk*.h`, excluded names or paths,
    /// directories and anything else that is not a regular file.
    pub fn collect_headers(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|source| StyleError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut headers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StyleError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with("vtk") || !name.ends_with(".h") {
                continue;
            }
            let path = dir.join(&name);
            if self.is_excluded(&name, &path) {
                continue;
            }
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => headers.push(path),
                _ => continue,
            }
        }
        Ok(headers)
    }

    /// Audit a single header file.
    pub fn audit_file(&self, path: &Path) -> Result<FileReport> {
        let bytes = fs::read(path).map_err(|source| StyleError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let text = utils::decode_ascii_lossy(&bytes);
        self.rules.check_file(&path.to_string_lossy(), &text)
    }

    /// Audit every header in `dir`.
    pub fn run(&self, dir: &Path) -> Result<AuditResult> {
        let headers = self.collect_headers(dir)?;
        let reports = headers
            .par_iter()
            .map(|p| self.audit_file(p))
            .collect::<Result<Vec<FileReport>>>()?;
        let mut summary = Summary::default();
        for r in &reports {
            summary.record(r);
        }
        Ok(AuditResult { reports, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mangle;
    use crate::models::Category;
    use tempfile::tempdir;

    fn header(name: &str, parent: &str) -> String {
        format!(
            "#ifndef {name}_h\n#define {name}_h\n#include \"{parent}.h\"\n\
             class VTKCOMMONCORE_EXPORT {name} : public {parent}\n{{\npublic:\n\
             vtkTypeMacro({name}, {parent});\n\
             void PrintSelf(ostream& os, vtkIndent indent) override;\n\
             private:\n\
             {name}(const {name}&) VTK_DELETE_FUNCTION;\n\
             void operator=(const {name}&) VTK_DELETE_FUNCTION;\n}};\n#endif\n"
        )
    }

    fn auditor(exclusions: &[&str]) -> Auditor {
        Auditor::new(
            Some("VTKCOMMONCORE_EXPORT".into()),
            &mangle::default_pattern_with::<&str>(&[]),
            exclusions.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_collect_headers_filters_names_dirs_and_exclusions() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("vtkFoo.h"), header("vtkFoo", "vtkObject")).unwrap();
        fs::write(root.join("vtkBar.h"), header("vtkBar", "vtkObject")).unwrap();
        fs::write(root.join("vtkFoo.cxx"), "int x;").unwrap();
        fs::write(root.join("Other.h"), "int y;").unwrap();
        fs::create_dir_all(root.join("vtkDir.h")).unwrap();

        let all = auditor(&[]).collect_headers(root).unwrap();
        let mut names: Vec<String> = all
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["vtkBar.h", "vtkFoo.h"]);

        let by_name = auditor(&["vtkBar.h"]).collect_headers(root).unwrap();
        assert_eq!(by_name, vec![root.join("vtkFoo.h")]);

        let full = root.join("vtkFoo.h").to_string_lossy().into_owned();
        let by_path = auditor(&[full.as_str()]).collect_headers(root).unwrap();
        assert_eq!(by_path, vec![root.join("vtkBar.h")]);
    }

    #[test]
    fn test_run_aggregates_categories() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("vtkFoo.h"), header("vtkFoo", "vtkObject")).unwrap();
        let legacy = header("vtkBar", "vtkObject").replace("vtkTypeMacro", "vtkTypeRevisionMacro");
        fs::write(root.join("vtkBar.h"), legacy).unwrap();

        let res = auditor(&[]).run(root).unwrap();
        assert_eq!(res.summary.files, 2);
        assert!(res.summary.failed());
        assert!(res.summary.errors.contains(&Category::LegacyTypeMacro));
        assert!(res.summary.warnings.is_empty());
    }

    #[test]
    fn test_non_ascii_bytes_do_not_abort() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let mut bytes = b"// caf\xc3\xa9 \xff\n".to_vec();
        bytes.extend_from_slice(header("vtkFoo", "vtkObject").as_bytes());
        fs::write(root.join("vtkFoo.h"), bytes).unwrap();
        let res = auditor(&[]).run(root).unwrap();
        assert!(!res.summary.failed());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = auditor(&[]).run(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, StyleError::ReadDir { .. }));
    }
}
