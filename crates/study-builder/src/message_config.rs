//! Email templates sent by the study.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_reply_to: Option<bool>,
}

/// Subject and HTML template for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MessageTranslation {
    pub lang: String,
    pub subject: String,
    pub template: String,
}

/// Authored message configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageConfig {
    /// Human-readable name; also names the output file.
    pub label: String,
    pub message_type: String,
    pub default_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_overrides: Option<HeaderOverrides>,
    pub translations: Vec<MessageTranslation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedTemplate {
    pub lang: String,
    pub subject: String,
    /// Base64 of the template text.
    pub template_def: String,
}

/// Message template document as read by the messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub message_type: String,
    pub study_key: String,
    pub default_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_overrides: Option<HeaderOverrides>,
    pub translations: Vec<LocalizedTemplate>,
}

pub fn build_message_config(config: &MessageConfig, study_key: &str) -> MessageTemplate {
    MessageTemplate {
        message_type: config.message_type.clone(),
        study_key: study_key.to_string(),
        default_language: config.default_language.clone(),
        header_overrides: config.header_overrides.clone(),
        translations: config
            .translations
            .iter()
            .map(|translation| LocalizedTemplate {
                lang: translation.lang.clone(),
                subject: translation.subject.clone(),
                template_def: STANDARD.encode(translation.template.as_bytes()),
            })
            .collect(),
    }
}

/// `Weekly Reminder` is written to `weekly_reminder.json`.
pub fn message_config_file_name(label: &str) -> String {
    format!("{}.json", label.replace(' ', "_").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reminder() -> MessageConfig {
        MessageConfig {
            label: "Weekly Reminder".into(),
            message_type: "weekly-reminder".into(),
            default_language: "en".into(),
            header_overrides: None,
            translations: vec![MessageTranslation {
                lang: "en".into(),
                subject: "Time for your check-in".into(),
                template: "<p>Hi</p>".into(),
            }],
        }
    }

    #[test]
    fn template_is_base64_encoded() {
        let built = build_message_config(&reminder(), "flu");
        assert_eq!(
            serde_json::to_value(&built).expect("serialize"),
            json!({
                "messageType": "weekly-reminder",
                "studyKey": "flu",
                "defaultLanguage": "en",
                "translations": [{
                    "lang": "en",
                    "subject": "Time for your check-in",
                    "templateDef": "PHA+SGk8L3A+"
                }]
            })
        );
    }

    #[test]
    fn file_name_from_label() {
        assert_eq!(
            message_config_file_name("Weekly Reminder"),
            "weekly_reminder.json"
        );
    }
}
