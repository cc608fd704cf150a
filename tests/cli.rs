use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const NONSENSE: &str = "qwzxvbk";

/// A texspell command isolated from the user's config and dictionaries.
fn texspell(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("texspell").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("TEXSPELL_LOG")
        .arg("--no-color");
    cmd
}

fn workspace_with(name: &str, contents: &str) -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(name), contents).unwrap();
    dir
}

#[test]
fn test_help() {
    let dir = tempdir().unwrap();
    texspell(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("LaTeX"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn test_no_files() {
    let dir = tempdir().unwrap();
    texspell(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files specified"));
}

#[test]
fn test_reports_misspelling_and_fails() {
    let dir = workspace_with("paper.tex", &format!("\\section{{{}}}\n", NONSENSE));

    texspell(dir.path())
        .arg("paper.tex")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(format!("Spelling: {} (bad)", NONSENSE)))
        .stdout(predicate::str::contains("1:10"));
}

#[test]
fn test_no_fail() {
    let dir = workspace_with("paper.tex", NONSENSE);

    texspell(dir.path())
        .args(["--no-fail", "paper.tex"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NONSENSE));
}

#[test]
fn test_command_names_are_not_words() {
    let dir = workspace_with("macros.sty", "\\newcommand\\qwzxvbk{}\n\\makeatletter\\qw@zx\n");

    texspell(dir.path())
        .arg("macros.sty")
        .assert()
        .success()
        .stdout(predicate::str::contains("No spelling errors found"));
}

#[test]
fn test_personal_dictionary() {
    let dir = workspace_with("paper.tex", NONSENSE);
    fs::write(dir.path().join("words.txt"), format!("# project words\n{}\n", NONSENSE)).unwrap();

    texspell(dir.path())
        .args(["--personal-dict", "words.txt", "paper.tex"])
        .assert()
        .success();
}

#[test]
fn test_add_to_dict() {
    let dir = workspace_with("paper.tex", NONSENSE);

    texspell(dir.path())
        .args(["--personal-dict", "words.txt", "--add-to-dict", NONSENSE])
        .assert()
        .success();

    let words = fs::read_to_string(dir.path().join("words.txt")).unwrap();
    assert!(words.lines().any(|line| line == NONSENSE));

    texspell(dir.path())
        .args(["--personal-dict", "words.txt", "paper.tex"])
        .assert()
        .success();
}

#[test]
fn test_region_dump_skips_math() {
    let dir = workspace_with("paper.tex", &format!("$x_{{{}}}$\n", NONSENSE));
    fs::write(
        dir.path().join("paper.tex.regions.json"),
        r#"[{"tag": "texMathZoneX", "start": [1, 1], "end": [1, 20]}]"#,
    )
    .unwrap();

    texspell(dir.path())
        .arg("paper.tex")
        .assert()
        .success();
}

#[test]
fn test_json_output() {
    let dir = workspace_with("paper.tex", &format!("Hello {}\n", NONSENSE));

    let output = texspell(dir.path())
        .args(["--format", "json", "--no-fail", "paper.tex"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_checked"], 1);
    let diagnostics = report["files"][0]["diagnostics"].as_array().unwrap();
    let flagged: Vec<_> = diagnostics
        .iter()
        .filter(|d| d["message"] == format!("Spelling: {} (bad)", NONSENSE))
        .collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["start_col"], 6);
    assert_eq!(flagged[0]["end_col"], 13);
}

#[test]
fn test_walks_directories() {
    let dir = tempdir().unwrap();
    let chapters = dir.path().join("chapters");
    fs::create_dir_all(&chapters).unwrap();
    fs::write(chapters.join("one.tex"), NONSENSE).unwrap();
    fs::write(chapters.join("notes.md"), NONSENSE).unwrap();

    texspell(dir.path())
        .args(["--no-fail", "chapters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one.tex"))
        .stdout(predicate::str::contains("notes.md").not());
}

#[test]
fn test_completion() {
    let dir = tempdir().unwrap();
    texspell(dir.path())
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("texspell"));
}

#[test]
fn test_overlapping_inputs_checked_once() {
    let dir = workspace_with("paper.tex", NONSENSE);

    let output = texspell(dir.path())
        .args(["--format", "json", "--no-fail", "paper.tex", ".", "./paper.tex"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_checked"], 1);
    assert_eq!(report["files"].as_array().unwrap().len(), 1);
    assert_eq!(report["total_errors"], 1);
}
