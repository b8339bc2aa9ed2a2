//! File-backed parsing: writes a real input file to a temp directory and
//! reads it back through `parser::parse_file`, the way the teacher repo's
//! `tests/config_tests.rs` exercises config loading against a `TempDir`.

use expert_system::parser::parse_file;
use expert_system::ExpertError;
use std::fs;
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write temp input file");
    path
}

#[test]
fn parse_file_reads_rules_facts_and_queries_from_disk() {
    let dir = TempDir::new().expect("create temp dir");
    let path = write_input(&dir, "program.txt", "A => B\n= A\n? B\n");

    let program = parse_file(&path).expect("parse_file should succeed");
    assert_eq!(program.rules.len(), 1);
    assert_eq!(program.initial_facts.len(), 1);
    assert_eq!(program.queries.len(), 1);
}

#[test]
fn parse_file_on_a_missing_path_is_an_io_error() {
    let dir = TempDir::new().expect("create temp dir");
    let missing = dir.path().join("does-not-exist.txt");

    let err = parse_file(&missing).unwrap_err();
    assert!(matches!(err, ExpertError::Io(_)));
}

#[test]
fn parse_file_rejects_a_syntax_error_from_disk() {
    let dir = TempDir::new().expect("create temp dir");
    let path = write_input(&dir, "bad.txt", "a => B\n");

    let err = parse_file(&path).unwrap_err();
    assert!(matches!(err, ExpertError::Syntax(_)));
}
