use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::component::LocalizedString;
use super::item::{SurveyGroupItem, SurveyItem};
use crate::expr::{Expression, ExpressionArg};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<LocalizedString>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<LocalizedString>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_duration: Option<Vec<LocalizedString>>,
}

/// Responses and flags the runtime loads before the survey is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyContextDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExpressionArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_responses: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_flags: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaxItemsPerPage {
    pub large: u32,
    pub small: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SurveyAvailableFor {
    Public,
    TemporaryParticipants,
    ActiveParticipants,
    ParticipantsIfAssigned,
}

/// Survey document as consumed by the study runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    #[serde(default)]
    pub props: SurveyProps,
    pub survey_definition: SurveyGroupItem,
    #[serde(default)]
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_rules: Option<SurveyContextDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill_rules: Option<Vec<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items_per_page: Option<MaxItemsPerPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for: Option<SurveyAvailableFor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_login_before_submission: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Survey {
    /// Empty survey whose root group carries `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            props: SurveyProps::default(),
            survey_definition: SurveyGroupItem {
                key: key.into(),
                ..Default::default()
            },
            version_id: String::new(),
            context_rules: None,
            prefill_rules: None,
            max_items_per_page: None,
            available_for: None,
            require_login_before_submission: None,
            metadata: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.survey_definition.key
    }

    /// Looks an item up by walking the nested tree.
    pub fn find_item(&self, key: &str) -> Option<&SurveyItem> {
        fn find<'a>(items: &'a [SurveyItem], key: &str) -> Option<&'a SurveyItem> {
            items.iter().find_map(|item| {
                if item.key() == key {
                    Some(item)
                } else {
                    find(item.children(), key)
                }
            })
        }
        find(&self.survey_definition.items, key)
    }

    /// Visits the survey-level rule expressions: prefill rules and context rules.
    pub fn for_each_rule_expression_mut(&mut self, visitor: &mut dyn FnMut(&mut Expression)) {
        for rule in self.prefill_rules.iter_mut().flatten() {
            visitor(rule);
        }
        if let Some(context) = self.context_rules.as_mut() {
            if let Some(ExpressionArg::Exp { exp }) = context.mode.as_mut() {
                visitor(exp);
            }
            for rule in context.previous_responses.iter_mut().flatten() {
                visitor(rule);
            }
            if let Some(flags) = context.participant_flags.as_mut() {
                visitor(flags);
            }
        }
    }
}
