//! CLI surface tests: help, version, `--emit-only`, and the exit-code
//! contract for a malformed source file (spec.md §7).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn pl0c_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pl0c"))
}

#[test]
fn help_mentions_usage() {
    Command::new(pl0c_bin())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("pl0c")));
}

#[test]
fn version_prints_something() {
    Command::new(pl0c_bin()).arg("--version").assert().success();
}

#[test]
fn emit_only_tokens_does_not_require_a_toolchain() {
    let input = fixtures_dir().join("read_write.pl0");
    Command::new(pl0c_bin())
        .arg(&input)
        .arg("--emit-only")
        .arg("tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("Word").or(predicate::str::contains("Ident")));
}

#[test]
fn emit_only_ast_prints_a_program_tree() {
    let input = fixtures_dir().join("read_write.pl0");
    Command::new(pl0c_bin())
        .arg(&input)
        .arg("--emit-only")
        .arg("ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program"));
}

#[test]
fn emit_only_ir_prints_llvm_ir_without_invoking_llc() {
    let input = fixtures_dir().join("read_write.pl0");
    Command::new(pl0c_bin())
        .arg(&input)
        .arg("--emit-only")
        .arg("ir")
        .assert()
        .success()
        .stdout(predicate::str::contains("define"));
}

#[test]
fn verbose_prints_tokens_ast_and_ir_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");
    let input = fixtures_dir().join("read_write.pl0");

    let assert = Command::new(pl0c_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-v")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let tokens_pos = stdout.find("word(const)").expect("token dump missing");
    let ast_pos = stdout.find("Program").expect("AST dump missing");
    let ir_pos = stdout.find("define").expect("IR dump missing");
    assert!(tokens_pos < ast_pos, "tokens should print before the AST");
    assert!(ast_pos < ir_pos, "AST should print before the IR");
    assert!(!stdout[..ast_pos].contains("eof("), "the eof sentinel should not be printed");
}

#[test]
fn syntax_error_exits_nonzero_with_unexpected_token_message() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");
    let input = fixtures_dir().join("syntax_error.pl0");

    Command::new(pl0c_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unexpected token"));
}

#[test]
fn missing_source_file_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");
    let input = temp_dir.path().join("does_not_exist.pl0");

    Command::new(pl0c_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(1);
}
