use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use markup_tree::parse_file;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join(path)
}

fn rendered(name: &str) -> String {
    parse_file(&fixture(name)).expect("fixture parse").to_text()
}

#[test]
fn merge_prints_combined_tree() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    let output = cmd
        .arg("merge")
        .arg(fixture("two_children.xml"))
        .arg(fixture("three_children.xml"))
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).expect("utf8"),
        rendered("three_children.xml")
    );
}

#[test]
fn merge_uses_rules_file() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    let output = cmd
        .arg("merge")
        .arg(fixture("choose.xml"))
        .arg(fixture("choose2.xml"))
        .arg("--rules")
        .arg(fixture("rules/choose.toml"))
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).expect("utf8"),
        rendered("merged_chooses2.xml")
    );
}

#[test]
fn merge_accepts_key_flags() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    let output = cmd
        .arg("merge")
        .arg(fixture("when.xml"))
        .arg(fixture("when2.xml"))
        .arg("--key")
        .arg("when=condition")
        .arg("--deep")
        .arg("choose")
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).expect("utf8"),
        rendered("merged_chooses.xml")
    );
}

#[test]
fn merge_rejects_malformed_key_flag() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("merge")
        .arg(fixture("when.xml"))
        .arg(fixture("when2.xml"))
        .arg("--key")
        .arg("when")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TAG=ATTRIBUTE"));
}

#[test]
fn merge_root_mismatch_fails_with_both_tags() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("merge")
        .arg(fixture("when.xml"))
        .arg(fixture("three_children.xml"))
        .arg("--root-element")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<rules>"))
        .stderr(predicate::str::contains("<list>"));
}

#[test]
fn merge_writes_output_file_and_summary() {
    let dir = tempdir().expect("tempdir");
    let out_path = dir.path().join("merged.xml");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("merge")
        .arg(fixture("main_layer.xml"))
        .arg(fixture("main_layer2.xml"))
        .arg("--rules")
        .arg(fixture("rules/layers.toml"))
        .arg("--output")
        .arg(&out_path)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("imported_right=2"));

    let written = fs::read_to_string(&out_path).expect("output readable");
    assert_eq!(written, rendered("main_layer2.xml"));
}

#[test]
fn merge_refuses_to_overwrite_input() {
    let dir = tempdir().expect("tempdir");
    let left_path = dir.path().join("left.xml");
    let right_path = dir.path().join("right.xml");
    fs::write(&left_path, "<root><a/></root>").expect("left write");
    fs::write(&right_path, "<root><b/></root>").expect("right write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("merge")
        .arg(&left_path)
        .arg(&right_path)
        .arg("--output")
        .arg(&left_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("would overwrite one of its inputs"));

    let untouched = fs::read_to_string(&left_path).expect("left readable");
    assert_eq!(untouched, "<root><a/></root>");
}

#[test]
fn lookahead_realigns_inserted_sibling() {
    let dir = tempdir().expect("tempdir");
    let left_path = dir.path().join("left.xml");
    let right_path = dir.path().join("right.xml");
    fs::write(&left_path, r#"<list><a k="1"/><b/></list>"#).expect("left write");
    fs::write(&right_path, r#"<list><x/><a k="2"/><b/></list>"#).expect("right write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    let output = cmd
        .arg("merge")
        .arg(&left_path)
        .arg(&right_path)
        .arg("--lookahead")
        .output()
        .expect("run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).expect("utf8"),
        "<list>\n  <x/>\n  <a k=\"2\"/>\n  <b/>\n</list>\n"
    );
}
