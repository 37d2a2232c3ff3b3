use std::collections::BTreeMap;

use serde_json::Value;
use tracing::error;

use crate::error::EditorError;
use crate::expr::Expression;
use crate::spec::{ItemComponent, LocalizedString, StyleEntry};

/// Role of the component that holds the answer options of a question.
pub const RESPONSE_GROUP_ROLE: &str = "responseGroup";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewComponentProps {
    pub role: String,
    pub key: Option<String>,
    pub is_group: bool,
}

impl NewComponentProps {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn group(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            is_group: true,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Owns one component and assigns into it.
#[derive(Debug, Clone)]
pub struct ComponentEditor {
    component: ItemComponent,
}

impl ComponentEditor {
    pub fn new(existing: Option<ItemComponent>, props: NewComponentProps) -> Self {
        let component = existing.unwrap_or_else(|| {
            let base = if props.is_group {
                ItemComponent::group(props.role)
            } else {
                ItemComponent::new(props.role)
            };
            ItemComponent {
                key: props.key,
                ..base
            }
        });
        Self { component }
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.component.key = key;
    }

    pub fn set_content(&mut self, content: Option<Vec<LocalizedString>>) {
        self.component.content = content;
    }

    pub fn set_description(&mut self, description: Option<Vec<LocalizedString>>) {
        self.component.description = description;
    }

    pub fn set_display_condition(&mut self, condition: Option<Expression>) {
        self.component.display_condition = condition;
    }

    pub fn set_disabled(&mut self, condition: Option<Expression>) {
        self.component.disabled = condition;
    }

    pub fn set_styles(&mut self, styles: Option<Vec<StyleEntry>>) {
        self.component.style = styles;
    }

    pub fn set_properties(&mut self, properties: Option<BTreeMap<String, Value>>) {
        self.component.properties = properties;
    }

    pub fn set_dtype(&mut self, dtype: Option<String>) {
        self.component.dtype = dtype;
    }

    pub fn set_order(&mut self, order: Option<Expression>) {
        self.component.order = order;
    }

    /// Adds a child component; the component must be a group.
    pub fn add_item_component(
        &mut self,
        child: ItemComponent,
        at: Option<usize>,
    ) -> Result<(), EditorError> {
        insert_component(&mut self.component, child, at)
    }

    pub fn get_component(&self) -> ItemComponent {
        self.component.clone()
    }

    pub fn into_component(self) -> ItemComponent {
        self.component
    }
}

/// Inserts `child` into the `group` component, rejecting a key already used by a sibling.
pub(crate) fn insert_component(
    group: &mut ItemComponent,
    child: ItemComponent,
    at: Option<usize>,
) -> Result<(), EditorError> {
    let group_name = group.key.clone().unwrap_or_else(|| group.role.clone());
    let Some(items) = group.items.as_mut() else {
        return Err(EditorError::ComponentNotAGroup { key: group_name });
    };
    if let Some(key) = child.key_str()
        && items.iter().any(|item| item.key_str() == Some(key))
    {
        error!(group = %group_name, key, "duplicate component key");
        return Err(EditorError::DuplicateComponentKey {
            group: group_name,
            key: key.to_string(),
        });
    }
    let position = at.unwrap_or(items.len()).min(items.len());
    items.insert(position, child);
    Ok(())
}

/// Smallest non-negative integer not yet used as a child key of `group`.
pub(crate) fn next_free_key(group: &ItemComponent) -> String {
    let mut candidate = 0usize;
    loop {
        let key = candidate.to_string();
        if group.child(&key).is_none() {
            return key;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_group_components() {
        let editor = ComponentEditor::new(
            None,
            NewComponentProps::group("singleChoiceGroup").with_key("scg"),
        );
        let component = editor.get_component();
        assert!(component.is_group());
        assert_eq!(component.key.as_deref(), Some("scg"));
    }

    #[test]
    fn rejects_duplicate_child_keys() {
        let mut editor = ComponentEditor::new(
            None,
            NewComponentProps::group("singleChoiceGroup").with_key("scg"),
        );
        editor
            .add_item_component(ItemComponent::new("option").with_key("a"), None)
            .expect("first option");
        let err = editor
            .add_item_component(ItemComponent::new("option").with_key("a"), None)
            .expect_err("duplicate option");
        assert!(err.is_fatal());
        assert_eq!(
            err,
            EditorError::DuplicateComponentKey {
                group: "scg".into(),
                key: "a".into()
            }
        );
    }

    #[test]
    fn inserts_at_position() {
        let mut editor = ComponentEditor::new(None, NewComponentProps::group("responseGroup"));
        for key in ["a", "b"] {
            editor
                .add_item_component(ItemComponent::new("option").with_key(key), None)
                .expect("option");
        }
        editor
            .add_item_component(ItemComponent::new("option").with_key("first"), Some(0))
            .expect("option");
        let keys: Vec<_> = editor
            .get_component()
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.key)
            .collect();
        assert_eq!(keys, vec!["first", "a", "b"]);
    }

    #[test]
    fn leaf_components_take_no_children() {
        let mut editor = ComponentEditor::new(None, NewComponentProps::new("text"));
        let err = editor
            .add_item_component(ItemComponent::new("text"), None)
            .expect_err("not a group");
        assert_eq!(err, EditorError::ComponentNotAGroup { key: "text".into() });
    }

    #[test]
    fn free_numeric_keys() {
        let mut group = ItemComponent::group("responseGroup");
        assert_eq!(next_free_key(&group), "0");
        insert_component(&mut group, ItemComponent::new("input").with_key("0"), None)
            .expect("insert");
        insert_component(&mut group, ItemComponent::new("input").with_key("2"), None)
            .expect("insert");
        assert_eq!(next_free_key(&group), "1");
    }
}
