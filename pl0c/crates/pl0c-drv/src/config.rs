//! Resolved compiler configuration, derived from [`crate::cli::Cli`].
//!
//! Narrowed from the shape a general-purpose driver's `Config` would have
//! (no optimization levels, no target triple selection, no multiple emit
//! kinds beyond the three stages this pipeline has) to what PL/0-to-native
//! actually supports.

use std::path::{Path, PathBuf};

use crate::cli::{Cli, EmitStage};

#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    pub output: PathBuf,
    pub llc_path: PathBuf,
    pub verbose: bool,
    pub emit_only: Option<EmitStage>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let output = cli.output.unwrap_or_else(|| default_output_path(&cli.source));
        Self {
            source: cli.source,
            output,
            llc_path: cli.llc_path,
            verbose: cli.verbose,
            emit_only: cli.emit_only,
        }
    }

    /// `<source-basename>.bc`, independent of `-o`/`self.output`.
    pub fn bc_path(&self) -> PathBuf {
        self.source.with_extension("bc")
    }

    /// `<source-basename>.o`, independent of `-o`/`self.output`.
    pub fn obj_path(&self) -> PathBuf {
        self.source.with_extension("o")
    }
}

fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("")
}
