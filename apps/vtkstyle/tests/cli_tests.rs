#![allow(deprecated)] // cargo_bin deprecation - still works fine

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut c = Command::cargo_bin("vtkstyle").expect("binary should exist");
    c.env_remove("VTKSTYLE_OUTPUT")
        .env_remove("DART_TEST_FROM_DART")
        .env("NO_COLOR", "1");
    c
}

const CLEAN: &str = r#"#ifndef vtkFoo_h
#define vtkFoo_h

#include "vtkObject.h"

class VTKCOMMONCORE_EXPORT vtkFoo : public vtkObject
{
public:
  static vtkFoo* New();
  vtkTypeMacro(vtkFoo, vtkObject);
  void PrintSelf(ostream& os, vtkIndent indent) override;

protected:
  vtkFoo();
  ~vtkFoo() override;

private:
  vtkFoo(const vtkFoo&) VTK_DELETE_FUNCTION;
  void operator=(const vtkFoo&) VTK_DELETE_FUNCTION;
};

#endif
"#;

const WHITESMITHS: &str = "void f()\n  {\n  if (x)\n    {\n    foo();\n    }\n  }\n";
const ALLMAN: &str = "void f()\n{\n  if (x)\n  {\n    foo();\n  }\n}\n";

fn header_dir(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vtkFoo.h"), content).unwrap();
    dir
}

// ============================================================================
// audit
// ============================================================================

#[test]
fn audit_clean_header_prints_nothing() {
    let dir = header_dir(CLEAN);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .arg("VTKCOMMONCORE_EXPORT")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn audit_missing_printself_warns_but_passes() {
    let text = CLEAN.replace("  void PrintSelf(ostream& os, vtkIndent indent) override;\n", "");
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("warning[no-printself]"))
        .stdout(predicate::str::contains("There were warnings:"))
        .stdout(predicate::str::contains("There were errors:").not());
}

#[test]
fn audit_legacy_type_macro_fails() {
    let text = CLEAN.replace("vtkTypeMacro(", "vtkTypeRevisionMacro(");
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[legacy-type-macro]"))
        .stdout(predicate::str::contains("* legacy-type-macro"));
}

#[test]
fn audit_wrong_guard_reports_filename_mismatch() {
    let text = CLEAN.replace("vtkFoo_h", "vtkBar_h");
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("guard-filename-mismatch"));
}

#[test]
fn audit_exclusion_by_name_skips_file() {
    let text = CLEAN.replace("vtkTypeMacro(", "vtkTypeRevisionMacro(");
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .arg("VTKCOMMONCORE_EXPORT")
        .arg("vtkFoo.h")
        .assert()
        .success();
}

#[test]
fn audit_json_output_has_summary() {
    let text = CLEAN.replace("vtkTypeMacro(", "vtkTypeRevisionMacro(");
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .arg("--output")
        .arg("json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"legacy-type-macro\""))
        .stdout(predicate::str::contains("\"failed\": true"));
}

#[test]
fn audit_config_exclusions_apply() {
    let text = CLEAN.replace("vtkTypeMacro(", "vtkTypeRevisionMacro(");
    let dir = header_dir(&text);
    fs::write(
        dir.path().join("vtkstyle.toml"),
        "[audit]\nexclude = [\"vtkFoo.h\"]\n",
    )
    .unwrap();
    cmd().arg("audit").arg(dir.path()).assert().success();
}

#[test]
fn audit_escapes_findings_for_dart() {
    let text = CLEAN.replace(
        "#include \"vtkObject.h\"",
        "#include \"vtkObject.h\"\n#include <vector>",
    );
    let dir = header_dir(&text);
    cmd()
        .env("DART_TEST_FROM_DART", "1")
        .arg("audit")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("#include &lt;vector&gt;"))
        .stdout(predicate::str::contains("<vector>").not());
}

#[test]
fn audit_two_foreign_exclusion_markers() {
    let text = format!(
        "// VTK-HeaderTest-Exclude: vtkA.h\n// VTK-HeaderTest-Exclude: vtkB.h\n{CLEAN}"
    );
    let dir = header_dir(&text);
    cmd()
        .arg("audit")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("* wrong-exclusion"))
        .stdout(predicate::str::contains("* multiple-exclusion"));
}

#[test]
fn audit_missing_directory_exits_two() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg("audit")
        .arg(dir.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

// ============================================================================
// reindent
// ============================================================================

#[test]
fn reindent_rewrites_whitesmiths_to_allman() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("vtkFoo.cxx");
    fs::write(&file, WHITESMITHS).unwrap();

    cmd().arg("reindent").arg(&file).assert().success();
    assert_eq!(fs::read_to_string(&file).unwrap(), ALLMAN);

    // second run is a no-op
    cmd().arg("reindent").arg("--test").arg(&file).assert().success();
    assert_eq!(fs::read_to_string(&file).unwrap(), ALLMAN);
}

#[test]
fn reindent_test_mode_reports_and_leaves_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("vtkFoo.cxx");
    fs::write(&file, WHITESMITHS).unwrap();

    cmd()
        .arg("reindent")
        .arg("--test")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "incorrect brace indentation on 4 lines: 2, 4, 6, 7",
        ));
    assert_eq!(fs::read_to_string(&file).unwrap(), WHITESMITHS);
}

#[test]
fn reindent_accepts_test_flag_after_separator() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("vtkFoo.cxx");
    fs::write(&file, WHITESMITHS).unwrap();

    cmd()
        .arg("reindent")
        .arg("--")
        .arg("--test")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("incorrect brace indentation"))
        .stderr(predicate::str::contains("Failed to read file").not());
    assert_eq!(fs::read_to_string(&file).unwrap(), WHITESMITHS);
}

#[test]
fn reindent_keeps_indented_function_column() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("vtkFoo.cxx");
    fs::write(
        &file,
        "  void Foo()\n    {\n    if (x)\n      {\n      Bar();\n      }\n    }\n",
    )
    .unwrap();
    cmd().arg("reindent").arg(&file).assert().success();
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "  void Foo()\n  {\n    if (x)\n    {\n      Bar();\n    }\n  }\n"
    );
}

#[test]
fn reindent_leaves_initializer_lists_alone() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("table.c");
    let src = "static int values[] =\n  {\n  1, 2, 3\n  };\n";
    fs::write(&file, src).unwrap();
    cmd().arg("reindent").arg("--test").arg(&file).assert().success();
    assert_eq!(fs::read_to_string(&file).unwrap(), src);
}

#[test]
fn reindent_skips_generated_sources() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("lex.yy.c");
    fs::write(&file, WHITESMITHS).unwrap();
    cmd().arg("reindent").arg("--test").arg(&file).assert().success();
}

#[test]
fn reindent_expands_globs() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.cxx"), WHITESMITHS).unwrap();
    fs::write(dir.path().join("b.cxx"), WHITESMITHS).unwrap();
    let pattern = dir.path().join("*.cxx");
    cmd().arg("reindent").arg(&pattern).assert().success();
    assert_eq!(fs::read_to_string(dir.path().join("a.cxx")).unwrap(), ALLMAN);
    assert_eq!(fs::read_to_string(dir.path().join("b.cxx")).unwrap(), ALLMAN);
}

#[test]
fn reindent_missing_file_exits_two() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg("reindent")
        .arg(dir.path().join("nope.cxx"))
        .assert()
        .code(2);
}

#[test]
fn version_prints_crate_version() {
    cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
