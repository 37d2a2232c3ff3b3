use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const CLEAN: &str = r#"{
  "surveyDefinition": {
    "key": "s",
    "items": [
      {"key": "s.q1", "condition": {"name": "isDefined", "data": [{"dtype": "str", "str": "s.q2"}]}},
      {"key": "s.q2"}
    ]
  }
}"#;

const DUPLICATED: &str = r#"{
  "surveyDefinition": {"key": "s", "items": [{"key": "s.q"}, {"key": "s.q"}]}
}"#;

fn bin() -> Command {
    Command::cargo_bin("study-builder").expect("binary")
}

#[test]
fn check_accepts_clean_survey() {
    let temp = TempDir::new().expect("tempdir");
    let survey = temp.child("s.json");
    survey.write_str(CLEAN).expect("write");
    bin()
        .args(["check", "--survey"])
        .arg(survey.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("s: no duplicate keys"));
}

#[test]
fn check_fails_on_duplicates() {
    let temp = TempDir::new().expect("tempdir");
    let survey = temp.child("s.json");
    survey.write_str(DUPLICATED).expect("write");
    bin()
        .args(["check", "--survey"])
        .arg(survey.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "s.q is used twice (at index 0 and at index 1)",
        ));
}

#[test]
fn rekey_rewrites_references() {
    let temp = TempDir::new().expect("tempdir");
    let survey = temp.child("s.json");
    survey.write_str(CLEAN).expect("write");
    let out = temp.child("out.json");
    bin()
        .args(["rekey", "--from", "s.q2", "--to", "s.age", "--survey"])
        .arg(survey.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();
    let written = std::fs::read_to_string(out.path()).expect("read output");
    assert!(written.contains("\"s.age\""));
    assert!(!written.contains("s.q2"));
}

#[test]
fn rekey_can_leave_references() {
    let temp = TempDir::new().expect("tempdir");
    let survey = temp.child("s.json");
    survey.write_str(CLEAN).expect("write");
    bin()
        .args(["rekey", "--from", "s.q2", "--to", "s.age", "--ignore-references"])
        .arg("--survey")
        .arg(survey.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"str\":\"s.q2\""));
}

#[test]
fn export_writes_bundle() {
    let temp = TempDir::new().expect("tempdir");
    let bundle = temp.child("study.json");
    bundle
        .write_str(&format!(r#"{{"studyKey": "flu", "surveys": [{CLEAN}]}}"#))
        .expect("write");
    bin()
        .args(["export", "--pretty", "--study"])
        .arg(bundle.path())
        .arg("--out")
        .arg(temp.path().join("flu"))
        .assert()
        .success();
    temp.child("flu/surveys/s.json")
        .assert(predicate::str::contains("\"surveyDefinition\""));
}

#[test]
fn schema_lists_expression_fields() {
    bin()
        .args(["schema", "--kind", "expression"])
        .assert()
        .success()
        .stdout(predicate::str::contains("returnType"));
}

#[test]
fn missing_file_fails() {
    bin()
        .args(["check", "--survey", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
