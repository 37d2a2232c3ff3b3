//! Writes a study to disk.
//!
//! Exporting happens in two passes. [`plan_export`] builds every document in memory, so a fatal
//! survey error stops the export before anything is written. [`execute_export`] then writes the
//! files one by one; a failed write is logged and the remaining files are still written.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::error::BuildError;
use crate::message_config::{build_message_config, message_config_file_name};
use crate::study::Study;

pub const SURVEYS_DIR: &str = "surveys";
pub const CUSTOM_RULES_DIR: &str = "customRules";
pub const MESSAGE_CONFIGS_DIR: &str = "messageConfigs";
pub const STUDY_RULES_FILE: &str = "studyRules.json";

/// Destination of exported files.
pub trait FileSink {
    fn ensure_dir(&mut self, path: &Path) -> std::io::Result<()>;
    fn write_file(&mut self, path: &Path, contents: &str) -> std::io::Result<()>;
}

/// Writes to the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl FileSink for FsSink {
    fn ensure_dir(&mut self, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> std::io::Result<()> {
        fs::write(path, contents)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Defaults to `./output/<outputFolderName | studyKey>`.
    pub output_root: Option<PathBuf>,
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Relative to the output root.
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub output_root: PathBuf,
    /// Relative to the output root; the root itself is always created.
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PlannedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub output_root: PathBuf,
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

pub fn default_output_root(study: &Study) -> PathBuf {
    Path::new(".").join("output").join(study.output_name())
}

/// Builds every document of the study.
pub fn plan_export(study: &Study, options: &ExportOptions) -> Result<ExportPlan, BuildError> {
    let output_root = options
        .output_root
        .clone()
        .unwrap_or_else(|| default_output_root(study));
    let mut dirs = vec![PathBuf::from(SURVEYS_DIR)];
    let mut files = Vec::new();

    for definition in &study.surveys {
        let survey = definition.build_survey()?;
        files.push(PlannedFile {
            path: Path::new(SURVEYS_DIR).join(format!("{}.json", definition.survey_key())),
            contents: to_json(&survey, options.pretty, definition.survey_key())?,
        });
    }

    if let Some(rules) = &study.study_rules {
        files.push(PlannedFile {
            path: PathBuf::from(STUDY_RULES_FILE),
            contents: to_json(&rules.compose(), options.pretty, "study rules")?,
        });
    }

    if !study.custom_study_rules.is_empty() {
        dirs.push(PathBuf::from(CUSTOM_RULES_DIR));
        for rule in &study.custom_study_rules {
            files.push(PlannedFile {
                path: Path::new(CUSTOM_RULES_DIR).join(format!("{}.json", rule.name)),
                contents: to_json(&rule.rules, options.pretty, &rule.name)?,
            });
        }
    }

    if !study.message_configs.is_empty() {
        dirs.push(PathBuf::from(MESSAGE_CONFIGS_DIR));
        for config in &study.message_configs {
            let built = build_message_config(config, &study.study_key);
            files.push(PlannedFile {
                path: Path::new(MESSAGE_CONFIGS_DIR).join(message_config_file_name(&config.label)),
                contents: to_json(&built, options.pretty, &config.label)?,
            });
        }
    }

    Ok(ExportPlan {
        output_root,
        dirs,
        files,
    })
}

/// Writes a plan through `sink`. Only a missing directory aborts.
pub fn execute_export(plan: &ExportPlan, sink: &mut dyn FileSink) -> Result<ExportReport> {
    sink.ensure_dir(&plan.output_root).with_context(|| {
        format!(
            "export: failed to create directory {}",
            plan.output_root.display()
        )
    })?;
    for dir in &plan.dirs {
        let dir = plan.output_root.join(dir);
        sink.ensure_dir(&dir)
            .with_context(|| format!("export: failed to create directory {}", dir.display()))?;
    }

    let mut report = ExportReport {
        output_root: plan.output_root.clone(),
        ..Default::default()
    };
    for file in &plan.files {
        let target = plan.output_root.join(&file.path);
        match sink.write_file(&target, &file.contents) {
            Ok(()) => {
                info!(path = %file.path.display(), "saved");
                report.written.push(file.path.clone());
            }
            Err(err) => {
                error!(path = %target.display(), error = %err, "failed to write file");
                report.failed.push(file.path.clone());
            }
        }
    }
    Ok(report)
}

pub fn export_study(
    study: &Study,
    sink: &mut dyn FileSink,
    options: &ExportOptions,
) -> Result<ExportReport> {
    info!(study = study.output_name(), "generating files for study");
    let plan = plan_export(study, options)?;
    execute_export(&plan, sink)
}

pub(crate) fn to_json<T: Serialize + ?Sized>(
    value: &T,
    pretty: bool,
    what: &str,
) -> Result<String, BuildError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|source| BuildError::Serialize {
        what: what.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study::CustomStudyRule;
    use study_spec::engine::actions::finish_participation;
    use study_spec::{EventKind, StudyRules, Survey};

    fn study() -> Study {
        let mut study = Study::new("flu").with_survey(Survey::new("weekly"));
        study.study_rules =
            Some(StudyRules::new().with(EventKind::Enter, vec![finish_participation()]));
        study.custom_study_rules = vec![CustomStudyRule {
            name: "reset".into(),
            rules: vec![finish_participation()],
        }];
        study
    }

    #[test]
    fn plan_lists_every_document_in_section_order() {
        let plan = plan_export(&study(), &ExportOptions::default()).expect("plan");
        assert_eq!(plan.output_root, Path::new("./output/flu"));
        let paths: Vec<_> = plan.files.iter().map(|file| file.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("surveys/weekly.json"),
                PathBuf::from("studyRules.json"),
                PathBuf::from("customRules/reset.json"),
            ]
        );
        assert_eq!(
            plan.dirs,
            vec![PathBuf::from("surveys"), PathBuf::from("customRules")]
        );
    }

    #[test]
    fn duplicate_keys_abort_planning() {
        let mut broken = Survey::new("weekly");
        broken.survey_definition.items = vec![
            study_spec::SurveyItem::single("weekly.q"),
            study_spec::SurveyItem::single("weekly.q"),
        ];
        let study = Study::new("flu").with_survey(broken);
        let err = plan_export(&study, &ExportOptions::default()).expect_err("duplicates");
        assert!(err.is_fatal());
    }

    #[test]
    fn compact_and_pretty_output() {
        let compact = to_json(&Survey::new("s"), false, "s").expect("compact");
        assert!(!compact.contains('\n'));
        let pretty = to_json(&Survey::new("s"), true, "s").expect("pretty");
        assert!(pretty.contains("\n  \"surveyDefinition\""));
    }
}
