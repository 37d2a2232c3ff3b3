use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expr::{Expression, ExpressionArg};

/// Text for one language, assembled from string parts and expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedString {
    pub code: String,
    pub parts: Vec<ExpressionArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_text: Option<String>,
}

impl LocalizedString {
    pub fn text(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            parts: vec![ExpressionArg::str(text)],
            resolved_text: None,
        }
    }

    pub fn expression(code: impl Into<String>, expression: Expression) -> Self {
        Self {
            code: code.into(),
            parts: vec![ExpressionArg::exp(expression)],
            resolved_text: None,
        }
    }
}

/// Single `key`/`value` style hint, e.g. `className`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StyleEntry {
    pub key: String,
    pub value: String,
}

impl StyleEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new("className", value)
    }
}

/// Display or response component of a survey item.
///
/// A component carrying `items` is a group; its children are addressed by their `key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemComponent {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<LocalizedString>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<LocalizedString>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Vec<StyleEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Expression>,
}

impl ItemComponent {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn group(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            items: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.items.is_some()
    }

    pub fn key_str(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn child(&self, key: &str) -> Option<&ItemComponent> {
        self.items
            .as_ref()?
            .iter()
            .find(|item| item.key_str() == Some(key))
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut ItemComponent> {
        self.items
            .as_mut()?
            .iter_mut()
            .find(|item| item.key_str() == Some(key))
    }

    /// Visits every expression held by this component and its children.
    pub fn for_each_expression_mut(&mut self, visitor: &mut dyn FnMut(&mut Expression)) {
        for expression in [
            self.display_condition.as_mut(),
            self.disabled.as_mut(),
            self.order.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            visitor(expression);
        }
        for text in self
            .content
            .iter_mut()
            .chain(self.description.iter_mut())
            .flatten()
        {
            for part in &mut text.parts {
                if let Some(expression) = part.as_exp_mut() {
                    visitor(expression);
                }
            }
        }
        for child in self.items.iter_mut().flatten() {
            child.for_each_expression_mut(visitor);
        }
    }
}
