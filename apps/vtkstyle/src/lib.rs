//! vtkstyle core library.
//!
//! Two independent developer tools for the VTK source tree:
//! - a header auditor that checks `vtk*.h` class headers against the
//!   project coding standard;
//! - a brace reindenter that turns Whitesmiths-style braces into Allman.
//!
//! High-level modules:
//! - `audit`: Directory enumeration and parallel per-header auditing.
//! - `checks`: The header rules themselves.
//! - `reindent`: Delimiter walk and in-place rewriting.
//! - `scrub`: Comment- and literal-aware blanking shared by both tools.
//! - `mangle`: Preset list of names `windows.h` redefines.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Findings, categories, diagnostics and result containers.
//! - `output`: Human/JSON printers.
//! - `error`: Crate error type.
//! - `utils`: Supporting helpers.
pub mod audit;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod mangle;
pub mod models;
pub mod output;
pub mod reindent;
pub mod scrub;
pub mod utils;
