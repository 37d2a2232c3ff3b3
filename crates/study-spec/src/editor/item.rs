use std::collections::BTreeMap;

use tracing::warn;

use super::component::{
    ComponentEditor, NewComponentProps, RESPONSE_GROUP_ROLE, insert_component, next_free_key,
};
use crate::error::EditorError;
use crate::expr::Expression;
use crate::keys::RESPONSE_GROUP;
use crate::spec::{
    ConfidentialMode, ItemComponent, SurveyGroupItem, SurveyItem, SurveySingleItem, Validation,
};

/// Role of a single item's top-level component.
pub const ROOT_COMPONENT_ROLE: &str = "root";
/// Role of the title component.
pub const TITLE_ROLE: &str = "title";

/// Description of an item to create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewItemProps {
    pub item_key: String,
    pub is_group: bool,
    pub item_type: Option<String>,
}

impl NewItemProps {
    pub fn single(item_key: impl Into<String>) -> Self {
        Self {
            item_key: item_key.into(),
            ..Default::default()
        }
    }

    pub fn group(item_key: impl Into<String>) -> Self {
        Self {
            item_key: item_key.into(),
            is_group: true,
            item_type: None,
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }
}

/// Owns one survey item and assigns into it.
///
/// Nothing here looks at other items; cross-item rules belong to
/// [`SurveyEditor`](super::SurveyEditor).
#[derive(Debug, Clone)]
pub struct ItemEditor {
    item: SurveyItem,
}

impl ItemEditor {
    pub fn new(existing: Option<SurveyItem>, props: NewItemProps) -> Self {
        let item = existing.unwrap_or_else(|| {
            if props.is_group {
                SurveyItem::Group(SurveyGroupItem {
                    key: props.item_key,
                    selection_method: Some(Expression::named("sequential")),
                    ..Default::default()
                })
            } else {
                SurveyItem::Single(SurveySingleItem {
                    key: props.item_key,
                    item_type: props.item_type,
                    components: Some(root_component()),
                    ..Default::default()
                })
            }
        });
        Self { item }
    }

    pub fn key(&self) -> &str {
        self.item.key()
    }

    pub fn set_metadata(&mut self, metadata: Option<BTreeMap<String, String>>) {
        match &mut self.item {
            SurveyItem::Group(group) => group.metadata = metadata,
            SurveyItem::Single(single) => single.metadata = metadata,
        }
    }

    pub fn set_condition(&mut self, condition: Option<Expression>) {
        match &mut self.item {
            SurveyItem::Group(group) => group.condition = condition,
            SurveyItem::Single(single) => single.condition = condition,
        }
    }

    pub fn set_follows(&mut self, follows: Option<Vec<String>>) {
        match &mut self.item {
            SurveyItem::Group(group) => group.follows = follows,
            SurveyItem::Single(single) => single.follows = follows,
        }
    }

    pub fn set_priority(&mut self, priority: Option<f64>) {
        match &mut self.item {
            SurveyItem::Group(group) => group.priority = priority,
            SurveyItem::Single(single) => single.priority = priority,
        }
    }

    pub fn set_confidential_mode(&mut self, mode: Option<ConfidentialMode>) {
        match &mut self.item {
            SurveyItem::Single(single) => single.confidential_mode = mode,
            SurveyItem::Group(group) => {
                warn!(key = %group.key, "confidential mode ignored on group item")
            }
        }
    }

    pub fn set_selection_method(&mut self, method: Option<Expression>) {
        match &mut self.item {
            SurveyItem::Group(group) => group.selection_method = method,
            SurveyItem::Single(single) => {
                warn!(key = %single.key, "selection method ignored on single item")
            }
        }
    }

    pub fn add_validation(&mut self, validation: Validation) {
        match &mut self.item {
            SurveyItem::Single(single) => {
                single.validations.get_or_insert_with(Vec::new).push(validation)
            }
            SurveyItem::Group(group) => {
                warn!(key = %group.key, "validation ignored on group item")
            }
        }
    }

    /// Replaces the component with role `title`, or puts `title` first when there is none.
    pub fn set_title_component(&mut self, title: ItemComponent) -> Result<(), EditorError> {
        let root = self.root_component_mut()?;
        let items = root.items.get_or_insert_with(Vec::new);
        match items.iter().position(|item| item.role == TITLE_ROLE) {
            Some(index) => items[index] = title,
            None => items.insert(0, title),
        }
        Ok(())
    }

    pub fn add_display_component(
        &mut self,
        component: ItemComponent,
        at: Option<usize>,
    ) -> Result<ItemComponent, EditorError> {
        let root = self.root_component_mut()?;
        insert_component(root, component.clone(), at)?;
        Ok(component)
    }

    /// Creates a response component below `parent_key` (a dot path inside the root component).
    ///
    /// A response group without an explicit key gets `rg`; other components get the smallest
    /// free numeric key among their siblings.
    pub fn add_new_response_component(
        &mut self,
        props: NewComponentProps,
        parent_key: Option<&str>,
        at: Option<usize>,
    ) -> Result<ItemComponent, EditorError> {
        let parent = self.component_group_mut(parent_key)?;
        let key = match props.key.clone() {
            Some(key) => key,
            None if props.role == RESPONSE_GROUP_ROLE => RESPONSE_GROUP.to_string(),
            None => next_free_key(parent),
        };
        let component = ComponentEditor::new(None, props.with_key(key)).into_component();
        insert_component(parent, component.clone(), at)?;
        Ok(component)
    }

    pub fn add_existing_response_component(
        &mut self,
        component: ItemComponent,
        parent_key: Option<&str>,
        at: Option<usize>,
    ) -> Result<ItemComponent, EditorError> {
        let parent = self.component_group_mut(parent_key)?;
        insert_component(parent, component.clone(), at)?;
        Ok(component)
    }

    pub fn get_item(&self) -> SurveyItem {
        self.item.clone()
    }

    pub fn into_item(self) -> SurveyItem {
        self.item
    }

    fn root_component_mut(&mut self) -> Result<&mut ItemComponent, EditorError> {
        match &mut self.item {
            SurveyItem::Single(single) => Ok(single.components.get_or_insert_with(root_component)),
            SurveyItem::Group(group) => {
                warn!(key = %group.key, "group items have no components");
                Err(EditorError::ComponentNotFound {
                    key: ROOT_COMPONENT_ROLE.to_string(),
                })
            }
        }
    }

    fn component_group_mut(
        &mut self,
        parent_key: Option<&str>,
    ) -> Result<&mut ItemComponent, EditorError> {
        let mut current = self.root_component_mut()?;
        if let Some(path) = parent_key {
            for segment in path.split('.') {
                current = current.child_mut(segment).ok_or_else(|| {
                    warn!(key = path, "component cannot be found");
                    EditorError::ComponentNotFound {
                        key: path.to_string(),
                    }
                })?;
            }
        }
        if !current.is_group() {
            let key = parent_key.unwrap_or(ROOT_COMPONENT_ROLE).to_string();
            return Err(EditorError::ComponentNotAGroup { key });
        }
        Ok(current)
    }
}

fn root_component() -> ItemComponent {
    ItemComponent {
        order: Some(Expression::named("sequential")),
        ..ItemComponent::group(ROOT_COMPONENT_ROLE)
    }
}
