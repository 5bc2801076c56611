//! Command-line surface (spec.md §6).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// A PL/0-to-native compiler: lexes and parses PL/0 source, lowers it to
/// LLVM IR, and links a native executable via `llc` and the system C
/// compiler.
#[derive(Parser, Debug)]
#[command(name = "pl0c")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile PL/0 source to a native executable", long_about = None)]
pub struct Cli {
    /// PL/0 source file.
    pub source: PathBuf,

    /// Output executable path. Defaults to the source's basename without
    /// its extension.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to the `llc` tool.
    #[arg(short = 'l', long = "llc-path", value_name = "PATH", default_value = "llc")]
    pub llc_path: PathBuf,

    /// Print tokens, the parsed AST, and the generated LLVM IR.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Stop after a single pipeline stage and print it, instead of
    /// compiling all the way to a native executable.
    #[arg(long = "emit-only", value_enum)]
    pub emit_only: Option<EmitStage>,
}

/// A single pipeline stage this compiler can stop after and print, for
/// `--emit-only`. Limited to the stages this pipeline actually has - there
/// is no HIR/MIR/LIR here, unlike a general-purpose compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitStage {
    Tokens,
    Ast,
    Ir,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrites the literal `-llc PATH` spelling from spec.md §6 into clap's
/// `--llc-path` long form before parsing. clap's short flags are always a
/// single character, so `-llc` can't be declared as a `short` directly; this
/// normalizes the one multi-character single-dash flag this CLI documents.
fn normalize_args(args: impl Iterator<Item = std::ffi::OsString>) -> Vec<std::ffi::OsString> {
    args.map(|arg| if arg == "-llc" { "--llc-path".into() } else { arg }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_llc_to_path_lookup() {
        let cli = Cli::parse_from(["pl0c", "prog.pl0"]);
        assert_eq!(cli.llc_path, PathBuf::from("llc"));
        assert!(!cli.verbose);
        assert!(cli.output.is_none());
    }

    #[test]
    fn literal_llc_flag_sets_llc_path() {
        let args = normalize_args(["pl0c", "prog.pl0", "-llc", "/opt/llvm/bin/llc"].map(Into::into));
        let cli = Cli::parse_from(args);
        assert_eq!(cli.llc_path, PathBuf::from("/opt/llvm/bin/llc"));
    }

    #[test]
    fn parses_output_and_verbose() {
        let cli = Cli::parse_from(["pl0c", "prog.pl0", "-o", "prog", "-v"]);
        assert_eq!(cli.output, Some(PathBuf::from("prog")));
        assert!(cli.verbose);
    }

    #[test]
    fn parses_emit_only() {
        let cli = Cli::parse_from(["pl0c", "prog.pl0", "--emit-only", "ast"]);
        assert_eq!(cli.emit_only, Some(EmitStage::Ast));
    }
}
