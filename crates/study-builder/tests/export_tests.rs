use std::io;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use study_builder::message_config::MessageTranslation;
use study_builder::{
    ExportOptions, FileSink, FsSink, MessageConfig, Study, SurveyProps, SurveyScaffold,
    export_study,
};
use study_spec::engine::actions::finish_participation;
use study_spec::{EventKind, StudyRules, Survey, SurveyItem, translations};

fn intake() -> SurveyScaffold {
    let mut scaffold = SurveyScaffold::new(SurveyProps {
        survey_key: "intake".into(),
        name: translations([("en", "Intake")]),
        description: translations([("en", "About you")]),
        duration_text: translations([("en", "2 minutes")]),
        ..Default::default()
    })
    .expect("scaffold");
    scaffold
        .add_item(SurveyItem::single("intake.q1"), false)
        .expect("item");
    scaffold
}

fn study() -> Study {
    let mut study = Study::new("flu").with_survey(intake());
    study.study_rules =
        Some(StudyRules::new().with(EventKind::Submit, vec![finish_participation()]));
    study.message_configs = vec![MessageConfig {
        label: "Weekly Reminder".into(),
        message_type: "weekly".into(),
        default_language: "en".into(),
        header_overrides: None,
        translations: vec![MessageTranslation {
            lang: "en".into(),
            subject: "Reminder".into(),
            template: "<p>Please fill in the survey</p>".into(),
        }],
    }];
    study
}

#[derive(Default)]
struct RecordingSink {
    fail_on: Option<&'static str>,
    dirs: Vec<PathBuf>,
    written: Vec<PathBuf>,
}

impl FileSink for RecordingSink {
    fn ensure_dir(&mut self, path: &Path) -> io::Result<()> {
        self.dirs.push(path.to_path_buf());
        Ok(())
    }

    fn write_file(&mut self, path: &Path, _contents: &str) -> io::Result<()> {
        if self.fail_on.is_some_and(|name| path.ends_with(name)) {
            return Err(io::Error::other("disk full"));
        }
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn exports_study_to_disk() {
    let temp = TempDir::new().expect("tempdir");
    let options = ExportOptions {
        output_root: Some(temp.path().join("flu")),
        pretty: true,
    };
    let report = export_study(&study(), &mut FsSink, &options).expect("export");

    assert!(report.failed.is_empty());
    assert_eq!(report.written.len(), 3);
    temp.child("flu/surveys/intake.json")
        .assert(predicate::str::contains("\"key\": \"intake.q1\""));
    temp.child("flu/studyRules.json")
        .assert(predicate::str::contains("SUBMIT"));
    temp.child("flu/messageConfigs/weekly_reminder.json")
        .assert(predicate::str::contains("templateDef"));
    temp.child("flu/customRules").assert(predicate::path::missing());

    let written = std::fs::read_to_string(temp.path().join("flu/surveys/intake.json"))
        .expect("read survey");
    let survey: Survey = serde_json::from_str(&written).expect("parse survey");
    assert_eq!(survey.key(), "intake");
}

#[test]
fn failed_write_is_skipped() {
    let mut sink = RecordingSink {
        fail_on: Some("studyRules.json"),
        ..Default::default()
    };
    let options = ExportOptions {
        output_root: Some(PathBuf::from("out")),
        pretty: false,
    };
    let report = export_study(&study(), &mut sink, &options).expect("export");
    assert_eq!(report.failed, vec![PathBuf::from("studyRules.json")]);
    assert_eq!(report.written.len(), 2);
    assert_eq!(sink.written.len(), 2);
}

#[test]
fn duplicate_keys_stop_before_writing() {
    let mut broken = intake();
    broken
        .editor_mut()
        .add_existing_item(SurveyItem::single("intake.q2"), "intake", None)
        .expect("q2");
    let mut survey = broken.finish().expect("survey");
    survey
        .survey_definition
        .items
        .push(SurveyItem::single("intake.q2"));
    let study = Study::new("flu").with_survey(intake()).with_survey(survey);

    let mut sink = RecordingSink::default();
    let err = export_study(&study, &mut sink, &ExportOptions::default()).expect_err("duplicates");
    assert!(err.to_string().contains("intake.q2 is used twice"));
    assert!(sink.dirs.is_empty());
    assert!(sink.written.is_empty());
}
