use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join(path)
}

#[test]
fn check_reports_mergeable_trees() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("check")
        .arg(fixture("root.xml"))
        .arg(fixture("root_with_attribute.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("mergeable=true"))
        .stdout(predicate::str::contains("imported_left=0"));
}

#[test]
fn check_reports_mismatched_roots_without_failing() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("check")
        .arg(fixture("root.xml"))
        .arg(fixture("two_children.xml"))
        .arg("--root-element")
        .assert()
        .success()
        .stdout(predicate::str::contains("mergeable=false"))
        .stdout(predicate::str::contains("roots are not equivalent"));
}

#[test]
fn check_strict_fails_on_mismatch() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("check")
        .arg(fixture("root.xml"))
        .arg(fixture("two_children.xml"))
        .arg("--root-element")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode failed"));
}

#[test]
fn check_json_outputs_structured_report() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("markup-merge"));
    cmd.arg("check")
        .arg(fixture("when.xml"))
        .arg(fixture("when2.xml"))
        .arg("--rules")
        .arg(fixture("rules/choose.toml"))
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mergeable\": true"))
        .stdout(predicate::str::contains("\"imported_left\": 1"));
}
