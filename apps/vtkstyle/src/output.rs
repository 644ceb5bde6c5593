//! Output rendering for audit and reindent commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form is a single
//! document with per-file results and a top-level summary.

use crate::models::{AuditResult, Finding, ReindentReport, ReindentResult, Severity};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

/// At most this many line numbers are listed per file in a dry run.
const MAX_LISTED_LINES: usize = 10;

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} failed to render JSON: {}", utils::error_prefix(), e),
    }
}

/// Render one finding as `file:line: severity[category]: message`.
fn finding_header(f: &Finding, color: bool) -> String {
    let location = match f.line {
        Some(line) => format!("{}:{}", f.file, line),
        None => f.file.clone(),
    };
    let tag = format!("{}[{}]", f.severity, f.category);
    if !color {
        return format!("{}: {}: {}", location, tag, f.message);
    }
    let tag = match f.severity {
        Severity::Error => tag.red().bold().to_string(),
        Severity::Warning => tag.yellow().bold().to_string(),
    };
    format!("{}: {}: {}", location.bold(), tag, f.message)
}

/// Print audit results in the requested format.
pub fn print_audit(res: &AuditResult, output: &str, dart: bool) {
    if output == "json" {
        print_json(&compose_audit_json(res));
        return;
    }
    for line in render_audit(res, utils::stdout_colors(output), dart) {
        println!("{}", line);
    }
}

/// Human audit output: every finding with its context lines, then the
/// categories seen during the run. A clean run renders nothing.
///
/// Under the dashboard driver (`dart`) finding text is HTML-escaped.
pub fn render_audit(res: &AuditResult, color: bool, dart: bool) -> Vec<String> {
    let escape = |s: &str| {
        if dart {
            utils::html_escape(s)
        } else {
            s.to_string()
        }
    };
    let mut out = Vec::new();
    for report in &res.reports {
        for f in &report.findings {
            out.push(escape(&finding_header(f, color)));
            for ctx in &f.context {
                out.push(format!("    {}", escape(ctx)));
            }
        }
    }
    if !res.summary.warnings.is_empty() {
        out.push("There were warnings:".to_string());
        out.extend(res.summary.warnings.iter().map(|c| format!("* {}", c)));
    }
    if !res.summary.errors.is_empty() {
        if color {
            out.push("There were errors:".red().bold().to_string());
        } else {
            out.push("There were errors:".to_string());
        }
        out.extend(res.summary.errors.iter().map(|c| format!("* {}", c)));
    }
    out
}

/// `Warning: <path>: incorrect brace indentation on N line(s): ...` for a
/// file that a dry run would change.
pub fn dry_run_warning(report: &ReindentReport) -> Option<String> {
    if !report.changed {
        return None;
    }
    let count = report.changed_lines.len();
    let mut listed: Vec<String> = report
        .changed_lines
        .iter()
        .take(MAX_LISTED_LINES)
        .map(|l| l.to_string())
        .collect();
    if count > MAX_LISTED_LINES {
        listed.push("...".to_string());
    }
    let noun = if count == 1 { "line" } else { "lines" };
    Some(format!(
        "Warning: {}: incorrect brace indentation on {} {}: {}",
        report.file,
        count,
        noun,
        listed.join(", ")
    ))
}

/// Print reindent results. Diagnostics and dry-run warnings go to stderr;
/// rewritten files are listed on stdout.
pub fn print_reindent(res: &ReindentResult, output: &str) {
    if output == "json" {
        print_json(&compose_reindent_json(res));
        return;
    }
    let color = utils::stdout_colors(output);
    for r in &res.reports {
        for d in &r.diagnostics {
            match d.line {
                Some(line) => eprintln!("{} {}:{}: {}", utils::warn_prefix(), r.file, line, d.message),
                None => eprintln!("{} {}: {}", utils::warn_prefix(), r.file, d.message),
            }
        }
        if res.dry_run {
            if let Some(w) = dry_run_warning(r) {
                eprintln!("{}", w);
            }
        } else if r.changed {
            if color {
                println!("{} {}", "reindented:".green().bold(), r.file.bold());
            } else {
                println!("reindented: {}", r.file);
            }
        }
    }
}

/// Compose audit JSON object (pure) for testing purposes.
pub fn compose_audit_json(res: &AuditResult) -> JsonVal {
    let files: Vec<JsonVal> = res
        .reports
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(JsonVal::Null))
        .collect();
    json!({
        "files": files,
        "summary": {
            "errors": res.summary.errors.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "warnings": res.summary.warnings.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "files": res.summary.files,
            "excluded": res.summary.excluded,
            "failed": res.summary.failed(),
        }
    })
}

/// Compose reindent JSON object (pure) for testing purposes.
pub fn compose_reindent_json(res: &ReindentResult) -> JsonVal {
    let files: Vec<JsonVal> = res
        .reports
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(JsonVal::Null))
        .collect();
    json!({
        "files": files,
        "summary": {
            "dry_run": res.dry_run,
            "files": res.files,
            "skipped": res.skipped,
            "changed": res.changed,
            "failed": res.failed(),
        }
    })
}
