//! vtkstyle CLI binary entry point.
//! Resolves configuration, runs the requested tool and maps results to exit
//! codes: 0 clean, 1 findings (or changes under `--test`), 2 fatal errors.

use clap::{CommandFactory, Parser};
use std::path::Path;
use vtkstyle::audit::Auditor;
use vtkstyle::cli::{self, Cli, Commands};
use vtkstyle::error::Result;
use vtkstyle::reindent::{self, Reindenter};
use vtkstyle::{config, output, utils};

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            if let Some(cause) = std::error::Error::source(&e) {
                eprintln!("  caused by: {}", cause);
            }
            std::process::exit(2);
        }
    }
}

fn note_missing_config(eff: &config::Effective) {
    if eff.config_path.is_none() && eff.output != "json" && !eff.dart {
        eprintln!(
            "{} No vtkstyle.toml found; using defaults.",
            utils::note_prefix()
        );
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Audit {
            repo_root,
            output,
            directory,
            rest,
        } => {
            let (export, mut exclusions) = cli::split_export(&rest);
            let root = repo_root.as_deref().unwrap_or(directory.as_str());
            let eff = config::resolve_effective(Some(root), output.as_deref(), export.as_deref())?;
            note_missing_config(&eff);
            if let Some(export) = eff.export.as_deref() {
                if eff.output != "json" && !eff.dart {
                    eprintln!("{} Using export macro {}", utils::info_prefix(), export);
                }
            }
            exclusions.extend(eff.exclusions.iter().cloned());
            let auditor = Auditor::new(eff.export.clone(), &eff.windows_mangle, exclusions)?;
            let result = auditor.run(Path::new(&directory))?;
            output::print_audit(&result, &eff.output, eff.dart);
            Ok(if result.summary.failed() { 1 } else { 0 })
        }
        Commands::Reindent {
            repo_root,
            output,
            test,
            files,
        } => {
            let (test, files) = cli::split_reindent_args(test, &files);
            if files.is_empty() {
                Cli::command()
                    .error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "reindent needs at least one file",
                    )
                    .exit();
            }
            let eff = config::resolve_effective(repo_root.as_deref(), output.as_deref(), None)?;
            let files = reindent::expand_inputs(&files)?;
            let reindenter = Reindenter::new(eff.reindent_ignore.clone(), eff.max_passes);
            let result = reindenter.run(&files, test)?;
            output::print_reindent(&result, &eff.output);
            Ok(if result.failed() { 1 } else { 0 })
        }
    }
}
