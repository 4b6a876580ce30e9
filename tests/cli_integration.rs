/*!
 * End-to-end tests for the command-line interface
 */

use std::fs;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_promptpack");

// Helper to pack `dir` into `output` with extra flags
fn run_pack(dir: &Path, output: &Path, extra: &[&str]) -> ExitStatus {
    Command::new(BIN)
        .arg("-q")
        .args(extra)
        .arg(dir)
        .arg(output)
        .status()
        .unwrap()
}

// Helper to create a small project tree under `root`
fn setup_repo(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("src").join("__pycache__"))?;
    fs::write(root.join("src").join("app.py"), "x = 1\n")?;
    fs::write(
        root.join("src").join("__pycache__").join("app.cpython-311.pyc"),
        [0u8, 1, 2, 3],
    )?;
    fs::write(root.join("notes.md"), "# Notes\n")?;
    Ok(())
}

#[test]
fn test_pack_writes_document() {
    let temp_dir = tempdir().unwrap();
    let repo = temp_dir.path().join("repo");
    setup_repo(&repo).unwrap();

    let output = temp_dir.path().join("out.xml");
    assert!(run_pack(&repo, &output, &[]).success());

    let document = fs::read_to_string(&output).unwrap();
    assert!(document.contains("<repository name=\"repo\""));
    assert!(document.contains("<file name=\"app.py\""));
    assert!(document.contains("x = 1"));
    assert!(document.contains("<file name=\"notes.md\""));
    assert!(!document.contains("__pycache__"));
}

#[test]
fn test_pack_is_deterministic() {
    let temp_dir = tempdir().unwrap();
    let repo = temp_dir.path().join("repo");
    setup_repo(&repo).unwrap();

    let output = temp_dir.path().join("out.xml");
    assert!(run_pack(&repo, &output, &[]).success());
    let first = fs::read_to_string(&output).unwrap();

    assert!(run_pack(&repo, &output, &[]).success());
    let second = fs::read_to_string(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_tree_format_flag() {
    let temp_dir = tempdir().unwrap();
    let repo = temp_dir.path().join("repo");
    setup_repo(&repo).unwrap();

    let output = temp_dir.path().join("out.txt");
    assert!(run_pack(&repo, &output, &["--format", "tree"]).success());

    let document = fs::read_to_string(&output).unwrap();
    assert!(document.contains("[src/]"));
    assert!(document.contains("app.py"));
    assert!(!document.contains("<file"));
    assert!(!document.contains("x = 1"));
}

#[test]
fn test_missing_target_fails() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("missing");
    let output = temp_dir.path().join("out.xml");

    let status = run_pack(&missing, &output, &[]);
    assert!(!status.success());
    assert!(!output.exists());
}
