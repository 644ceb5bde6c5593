//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vtkstyle",
    version,
    about = "VTK header auditor and brace reindenter",
    long_about = "vtkstyle — checks VTK class headers against the project coding standard and converts Whitesmiths brace indentation to Allman.\n\nConfiguration precedence: CLI > environment > vtkstyle.toml > defaults.",
    after_help = "Examples:\n  vtkstyle audit Common/Core VTKCOMMONCORE_EXPORT vtkABI.h\n  vtkstyle reindent --test Common/Core/*.cxx\n  vtkstyle reindent -- --test Filters/General/vtkClipVolume.cxx",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current vtkstyle version.")]
    Version,
    /// Audit the headers of one directory
    #[command(
        about = "Audit vtk*.h headers",
        long_about = "Check every vtk*.h header of a directory: include guard, single exported class, type macro, deleted copy/assignment, PrintSelf, includes and Windows-mangled names. Exits 1 when any error category was seen.",
        after_help = "The second positional is taken as the export macro when it starts with VTK and ends with EXPORT; the remaining ones are excluded file names or paths.\n\nExamples:\n  vtkstyle audit Common/Core\n  vtkstyle audit Common/Core VTKCOMMONCORE_EXPORT vtkWin32Header.h\n  vtkstyle audit Common/Core --output json"
    )]
    Audit {
        #[arg(long, help = "Repository root used for config discovery (default: the audited directory)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Directory whose vtk*.h headers are audited")]
        directory: String,
        #[arg(help = "Optional export macro followed by exclusions")]
        rest: Vec<String>,
    },
    /// Convert Whitesmiths braces to Allman
    #[command(
        about = "Re-indent braces",
        long_about = "Move braces that stand at the start of their line to the indentation of the statement owning them. Files are rewritten in place unless --test is given.",
        after_help = "Examples:\n  vtkstyle reindent --test vtkFoo.cxx vtkFoo.h\n  vtkstyle reindent 'Common/Core/*.cxx'"
    )]
    Reindent {
        #[arg(long, help = "Repository root used for config discovery (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long = "test", action = clap::ArgAction::SetTrue, help = "Report files that would change and exit 1 instead of writing")]
        test: bool,
        #[arg(required = true, help = "Files or glob patterns")]
        files: Vec<String>,
    },
}

/// Split the trailing audit positionals into `(export_macro, exclusions)`.
///
/// Only the first one may be the export macro, and only when it looks like
/// `VTK..._EXPORT`.
pub fn split_export(rest: &[String]) -> (Option<String>, Vec<String>) {
    match rest.split_first() {
        Some((first, tail)) if first.starts_with("VTK") && first.ends_with("EXPORT") => {
            (Some(first.clone()), tail.to_vec())
        }
        _ => (None, rest.to_vec()),
    }
}

/// Pull `--test` and bare `--` separators off the front of the reindent
/// file list, so `reindent -- --test file` and `reindent --test -- file`
/// mean the same thing. Everything after the first other token is a file.
pub fn split_reindent_args(test: bool, files: &[String]) -> (bool, Vec<String>) {
    let mut test = test;
    let mut rest = files;
    while let Some((first, tail)) = rest.split_first() {
        match first.as_str() {
            "--test" => test = true,
            "--" => {}
            _ => break,
        }
        rest = tail;
    }
    (test, rest.to_vec())
}
