//! Configuration discovery and effective settings resolution.
//!
//! vtkstyle reads `vtkstyle.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags and the environment to
//! produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `audit.export`: none (export macro names are not compared)
//! - `audit.windows_mangle`: built from the preset in `mangle`
//! - `reindent.ignore`: `lex.yy.c`, `vtkParse.tab.c`
//! - `reindent.max_passes`: 8
//!
//! Overrides precedence: CLI > environment > config file > defaults.

use crate::error::{Result, StyleError};
use crate::mangle;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Generated sources that are never re-indented.
pub const DEFAULT_REINDENT_IGNORE: &[&str] = &["lex.yy.c", "vtkParse.tab.c"];

/// Environment fallback for `--output`.
pub const OUTPUT_ENV: &str = "VTKSTYLE_OUTPUT";

const CONFIG_NAMES: &[&str] = &["vtkstyle.toml", "vtkstyle.yaml", "vtkstyle.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Header auditor section under `[audit]`.
pub struct AuditCfg {
    pub export: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Full regular expression; replaces the preset name list.
    pub windows_mangle: Option<String>,
    /// Extra names appended to the preset list.
    #[serde(default)]
    pub windows_mangle_names: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Reindenter section under `[reindent]`.
pub struct ReindentCfg {
    #[serde(default)]
    pub ignore: Vec<String>,
    pub max_passes: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `vtkstyle.toml|yaml`.
pub struct StyleConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub audit: Option<AuditCfg>,
    #[serde(default)]
    pub reindent: Option<ReindentCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: String,
    pub export: Option<String>,
    pub exclusions: Vec<String>,
    pub windows_mangle: String,
    pub reindent_ignore: Vec<String>,
    pub max_passes: usize,
    pub dart: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `vtkstyle.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Path of the config file under `root`, if any.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_NAMES
        .iter()
        .map(|n| root.join(n))
        .find(|p| p.is_file())
}

/// Load `StyleConfig` from `vtkstyle.toml` or `vtkstyle.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<StyleConfig>> {
    let Some(path) = find_config(root) else {
        return Ok(None);
    };
    let s = fs::read_to_string(&path).map_err(|source| StyleError::FileRead {
        path: path.clone(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let cfg = if is_toml {
        toml::from_str::<StyleConfig>(&s).map_err(|e| StyleError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str::<StyleConfig>(&s).map_err(|e| StyleError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?
    };
    Ok(Some(cfg))
}

/// Resolve `Effective` by merging CLI flags, environment, discovered config,
/// and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_export: Option<&str>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let config_path = find_config(&repo_root);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let audit = cfg.audit.unwrap_or_default();
    let reindent = cfg.reindent.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or_else(|| std::env::var(OUTPUT_ENV).ok().filter(|s| !s.is_empty()))
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let export = cli_export.map(|s| s.to_string()).or(audit.export);

    let windows_mangle = audit
        .windows_mangle
        .unwrap_or_else(|| mangle::default_pattern_with(&audit.windows_mangle_names));

    let mut reindent_ignore: Vec<String> = DEFAULT_REINDENT_IGNORE
        .iter()
        .map(|s| s.to_string())
        .collect();
    reindent_ignore.extend(reindent.ignore);

    Ok(Effective {
        repo_root,
        config_path,
        output,
        export,
        exclusions: audit.exclude,
        windows_mangle,
        reindent_ignore,
        max_passes: reindent.max_passes.unwrap_or(8).max(1),
        dart: crate::utils::dart_mode(),
    })
}
