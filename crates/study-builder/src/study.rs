use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use study_spec::{Expression, StudyRules, Survey};

use crate::error::BuildError;
use crate::message_config::MessageConfig;
use crate::scaffold::SurveyDefinition;

/// Rules triggered manually instead of by study events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CustomStudyRule {
    pub name: String,
    pub rules: Vec<Expression>,
}

/// Everything exported for one study.
pub struct Study {
    pub study_key: String,
    pub output_folder_name: Option<String>,
    pub surveys: Vec<Box<dyn SurveyDefinition>>,
    pub study_rules: Option<StudyRules>,
    pub custom_study_rules: Vec<CustomStudyRule>,
    pub message_configs: Vec<MessageConfig>,
}

impl Study {
    pub fn new(study_key: impl Into<String>) -> Self {
        Self {
            study_key: study_key.into(),
            output_folder_name: None,
            surveys: Vec::new(),
            study_rules: None,
            custom_study_rules: Vec::new(),
            message_configs: Vec::new(),
        }
    }

    pub fn with_survey(mut self, survey: impl SurveyDefinition + 'static) -> Self {
        self.surveys.push(Box::new(survey));
        self
    }

    /// Name of the output folder: `output_folder_name`, or the study key.
    pub fn output_name(&self) -> &str {
        self.output_folder_name
            .as_deref()
            .unwrap_or(&self.study_key)
    }
}

impl std::fmt::Debug for Study {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Study")
            .field("study_key", &self.study_key)
            .field("output_folder_name", &self.output_folder_name)
            .field(
                "surveys",
                &self
                    .surveys
                    .iter()
                    .map(|survey| survey.survey_key())
                    .collect::<Vec<_>>(),
            )
            .field("study_rules", &self.study_rules)
            .field("custom_study_rules", &self.custom_study_rules)
            .field("message_configs", &self.message_configs)
            .finish()
    }
}

/// Study stored as a single JSON file, with surveys as finished documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyBundle {
    pub study_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_folder_name: Option<String>,
    #[serde(default)]
    pub surveys: Vec<Survey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_rules: Option<StudyRules>,
    #[serde(default)]
    pub custom_study_rules: Vec<CustomStudyRule>,
    #[serde(default)]
    pub message_configs: Vec<MessageConfig>,
}

impl StudyBundle {
    pub fn from_path(path: &Path) -> Result<Self, BuildError> {
        let raw = fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| BuildError::Parse {
            path: path.to_path_buf(),
            what: "study bundle",
            source,
        })
    }
}

impl From<StudyBundle> for Study {
    fn from(bundle: StudyBundle) -> Self {
        Self {
            study_key: bundle.study_key,
            output_folder_name: bundle.output_folder_name,
            surveys: bundle
                .surveys
                .into_iter()
                .map(|survey| Box::new(survey) as Box<dyn SurveyDefinition>)
                .collect(),
            study_rules: bundle.study_rules,
            custom_study_rules: bundle.custom_study_rules,
            message_configs: bundle.message_configs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_fills_missing_lists() {
        let bundle: StudyBundle = serde_json::from_value(json!({
            "studyKey": "flu",
            "surveys": [{"surveyDefinition": {"key": "weekly", "items": []}}]
        }))
        .expect("bundle");
        let study = Study::from(bundle);
        assert_eq!(study.output_name(), "flu");
        assert_eq!(study.surveys.len(), 1);
        assert_eq!(study.surveys[0].survey_key(), "weekly");
        assert!(study.custom_study_rules.is_empty());
    }

    #[test]
    fn output_folder_overrides_study_key() {
        let mut study = Study::new("flu");
        study.output_folder_name = Some("flu-2024".into());
        assert_eq!(study.output_name(), "flu-2024");
    }
}
