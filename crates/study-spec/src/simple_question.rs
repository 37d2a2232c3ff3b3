use std::collections::BTreeMap;

use crate::editor::{ItemEditor, NewComponentProps, NewItemProps, RESPONSE_GROUP_ROLE};
use crate::error::EditorError;
use crate::expr::{Expression, arg, build_expression};
use crate::generators::{TitleContent, Translations, generate_title_component};
use crate::key_path::child_key;
use crate::keys::RESPONSE_GROUP;
use crate::spec::{ConfidentialMode, ItemComponent, SurveyItem, Validation, ValidationKind};

/// Key of the validation added by [`SimpleQuestionEditor::add_has_response_validation`].
pub const HAS_RESPONSE_VALIDATION_KEY: &str = "r1";

/// Single question item with a title, optional display texts and one response group.
#[derive(Debug, Clone)]
pub struct SimpleQuestionEditor {
    editor: ItemEditor,
}

impl SimpleQuestionEditor {
    pub fn new(
        parent_key: &str,
        key: &str,
        confidential_mode: Option<ConfidentialMode>,
        metadata: Option<BTreeMap<String, String>>,
    ) -> Self {
        let mut editor = ItemEditor::new(None, NewItemProps::single(child_key(parent_key, key)));
        editor.set_confidential_mode(confidential_mode);
        editor.set_metadata(metadata);
        Self { editor }
    }

    pub fn key(&self) -> &str {
        self.editor.key()
    }

    pub fn set_title(
        &mut self,
        content: TitleContent,
        description: Option<Translations>,
        class_name: Option<&str>,
    ) -> Result<(), EditorError> {
        self.editor
            .set_title_component(generate_title_component(content, description, class_name))
    }

    pub fn set_condition(&mut self, condition: Option<Expression>) {
        self.editor.set_condition(condition);
    }

    pub fn add_display_component(
        &mut self,
        component: ItemComponent,
        at: Option<usize>,
    ) -> Result<ItemComponent, EditorError> {
        self.editor.add_display_component(component, at)
    }

    /// Hard validation requiring any response in the `rg` group.
    pub fn add_has_response_validation(&mut self) {
        let rule = build_expression(
            "hasResponse",
            None,
            [arg(self.editor.key()), arg(RESPONSE_GROUP)],
        );
        self.editor.add_validation(Validation::new(
            HAS_RESPONSE_VALIDATION_KEY,
            ValidationKind::Hard,
            rule,
        ));
    }

    /// Adds the `rg` response group holding `content`.
    pub fn set_response_group_with_content(
        &mut self,
        content: ItemComponent,
    ) -> Result<ItemComponent, EditorError> {
        self.editor.add_new_response_component(
            NewComponentProps::group(RESPONSE_GROUP_ROLE).with_key(RESPONSE_GROUP),
            None,
            None,
        )?;
        self.editor
            .add_existing_response_component(content, Some(RESPONSE_GROUP), None)
    }

    pub fn get_item(&self) -> SurveyItem {
        self.editor.get_item()
    }

    pub fn into_item(self) -> SurveyItem {
        self.editor.into_item()
    }
}
