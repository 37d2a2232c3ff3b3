use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::component::ItemComponent;
use crate::expr::Expression;

/// Severity of a failed validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Soft,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    pub rule: Expression,
}

impl Validation {
    pub fn new(key: impl Into<String>, kind: ValidationKind, rule: Expression) -> Self {
        Self {
            key: key.into(),
            kind,
            rule,
        }
    }
}

/// How confidential responses are stored relative to the regular response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfidentialMode {
    Add,
    Replace,
}

/// Container item: a page or block holding ordered child items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyGroupItem {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_method: Option<Expression>,
    pub items: Vec<SurveyItem>,
}

/// Question or display item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveySingleItem {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<ItemComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Vec<Validation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential_mode: Option<ConfidentialMode>,
}

/// Node of the survey tree. An object carrying `items` is a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SurveyItem {
    Group(SurveyGroupItem),
    Single(SurveySingleItem),
}

impl SurveyItem {
    pub fn group(key: impl Into<String>) -> Self {
        Self::Group(SurveyGroupItem {
            key: key.into(),
            ..Default::default()
        })
    }

    pub fn single(key: impl Into<String>) -> Self {
        Self::Single(SurveySingleItem {
            key: key.into(),
            ..Default::default()
        })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Group(group) => &group.key,
            Self::Single(single) => &single.key,
        }
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        match self {
            Self::Group(group) => group.key = key.into(),
            Self::Single(single) => single.key = key.into(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn as_group(&self) -> Option<&SurveyGroupItem> {
        match self {
            Self::Group(group) => Some(group),
            Self::Single(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut SurveyGroupItem> {
        match self {
            Self::Group(group) => Some(group),
            Self::Single(_) => None,
        }
    }

    pub fn as_single(&self) -> Option<&SurveySingleItem> {
        match self {
            Self::Single(single) => Some(single),
            Self::Group(_) => None,
        }
    }

    pub fn as_single_mut(&mut self) -> Option<&mut SurveySingleItem> {
        match self {
            Self::Single(single) => Some(single),
            Self::Group(_) => None,
        }
    }

    /// Child items of a group; empty for single items.
    pub fn children(&self) -> &[SurveyItem] {
        match self {
            Self::Group(group) => &group.items,
            Self::Single(_) => &[],
        }
    }

    pub fn condition(&self) -> Option<&Expression> {
        match self {
            Self::Group(group) => group.condition.as_ref(),
            Self::Single(single) => single.condition.as_ref(),
        }
    }

    pub fn follows_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::Group(group) => group.follows.as_mut(),
            Self::Single(single) => single.follows.as_mut(),
        }
    }

    /// Takes the child items out of a group, leaving it empty.
    pub fn take_children(&mut self) -> Vec<SurveyItem> {
        match self {
            Self::Group(group) => std::mem::take(&mut group.items),
            Self::Single(_) => Vec::new(),
        }
    }

    /// Shallow merge: fields set on `newer` win, unset ones keep the value of `self`.
    ///
    /// A group's child list is always taken from `newer`. When the kinds differ `newer` is
    /// returned as is.
    pub fn merged_with(self, newer: SurveyItem) -> SurveyItem {
        match (self, newer) {
            (Self::Group(old), Self::Group(new)) => Self::Group(SurveyGroupItem {
                key: new.key,
                metadata: new.metadata.or(old.metadata),
                follows: new.follows.or(old.follows),
                condition: new.condition.or(old.condition),
                priority: new.priority.or(old.priority),
                selection_method: new.selection_method.or(old.selection_method),
                items: new.items,
            }),
            (Self::Single(old), Self::Single(new)) => Self::Single(SurveySingleItem {
                key: new.key,
                metadata: new.metadata.or(old.metadata),
                follows: new.follows.or(old.follows),
                condition: new.condition.or(old.condition),
                priority: new.priority.or(old.priority),
                item_type: new.item_type.or(old.item_type),
                components: new.components.or(old.components),
                validations: new.validations.or(old.validations),
                confidential_mode: new.confidential_mode.or(old.confidential_mode),
            }),
            (_, newer) => newer,
        }
    }

    /// Visits the expressions owned by this item, not those of its child items.
    pub fn for_each_own_expression_mut(&mut self, visitor: &mut dyn FnMut(&mut Expression)) {
        match self {
            Self::Group(group) => {
                for expression in [group.condition.as_mut(), group.selection_method.as_mut()]
                    .into_iter()
                    .flatten()
                {
                    visitor(expression);
                }
            }
            Self::Single(single) => {
                if let Some(condition) = single.condition.as_mut() {
                    visitor(condition);
                }
                for validation in single.validations.iter_mut().flatten() {
                    visitor(&mut validation.rule);
                }
                if let Some(components) = single.components.as_mut() {
                    components.for_each_expression_mut(visitor);
                }
            }
        }
    }

    /// Depth-first walk over this item and all descendants.
    pub fn walk(&self, visitor: &mut dyn FnMut(&SurveyItem)) {
        visitor(self);
        for child in self.children() {
            child.walk(visitor);
        }
    }

    /// Mutable depth-first walk over this item and all descendants.
    pub fn walk_mut(&mut self, visitor: &mut dyn FnMut(&mut SurveyItem)) {
        visitor(self);
        if let Self::Group(group) = self {
            for child in &mut group.items {
                child.walk_mut(visitor);
            }
        }
    }
}

impl From<SurveyGroupItem> for SurveyItem {
    fn from(value: SurveyGroupItem) -> Self {
        Self::Group(value)
    }
}

impl From<SurveySingleItem> for SurveyItem {
    fn from(value: SurveySingleItem) -> Self {
        Self::Single(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_with_items_are_groups() {
        let item: SurveyItem = serde_json::from_value(json!({
            "key": "s.g",
            "items": [{"key": "s.g.q1", "type": "pageBreak"}]
        }))
        .expect("group");
        assert!(item.is_group());
        assert_eq!(item.children().len(), 1);
        assert!(!item.children()[0].is_group());
        assert_eq!(
            item.children()[0]
                .as_single()
                .and_then(|single| single.item_type.as_deref()),
            Some("pageBreak")
        );
    }

    #[test]
    fn unset_fields_are_absent() {
        let value = serde_json::to_value(SurveyItem::single("s.q1")).expect("serialize");
        assert_eq!(value, json!({"key": "s.q1"}));
    }

    #[test]
    fn merge_keeps_old_fields_and_takes_new_ones() {
        let old = SurveyItem::Single(SurveySingleItem {
            key: "s.q1".into(),
            condition: Some(Expression::named("old")),
            item_type: Some("surveyEnd".into()),
            ..Default::default()
        });
        let new = SurveyItem::Single(SurveySingleItem {
            key: "s.q1".into(),
            condition: Some(Expression::named("new")),
            ..Default::default()
        });
        let merged = old.merged_with(new);
        let single = merged.as_single().expect("single");
        assert_eq!(single.condition, Some(Expression::named("new")));
        assert_eq!(single.item_type.as_deref(), Some("surveyEnd"));
    }
}
