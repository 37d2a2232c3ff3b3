//! Base for hand-written survey definitions.

use study_spec::{
    DEFAULT_SURVEY_KEY, Expression, ItemEditor, NewItemProps, ReferencePolicy, Survey,
    SurveyAvailableFor, SurveyEditor, SurveyItem, Translations, check_duplicate_child_keys,
    generate_loc_strings, generate_page_break,
};
use tracing::error;

use crate::error::BuildError;

/// Survey-level settings applied when a scaffold is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyProps {
    pub survey_key: String,
    pub name: Translations,
    pub description: Translations,
    pub duration_text: Translations,
    pub available_for: Option<SurveyAvailableFor>,
    pub require_login_before_submission: Option<bool>,
}

/// Something that produces one survey document of a study.
pub trait SurveyDefinition {
    fn survey_key(&self) -> &str;

    /// Builds the document. Duplicate root-level keys are a fatal [`BuildError::DuplicateKeys`].
    fn build_survey(&self) -> Result<Survey, BuildError>;
}

/// Survey editor preset with the survey key, texts and a sequential root.
#[derive(Debug, Clone)]
pub struct SurveyScaffold {
    key: String,
    editor: SurveyEditor,
}

impl SurveyScaffold {
    pub fn new(props: SurveyProps) -> Result<Self, BuildError> {
        let mut editor = SurveyEditor::new();
        editor.change_item_key(DEFAULT_SURVEY_KEY, &props.survey_key, ReferencePolicy::Rewrite)?;
        editor.set_survey_name(generate_loc_strings(props.name));
        editor.set_survey_description(generate_loc_strings(props.description));
        editor.set_survey_duration(generate_loc_strings(props.duration_text));
        editor.set_available_for(props.available_for);
        editor.set_require_login_before_submission(props.require_login_before_submission);

        let root = editor.find_item(&props.survey_key)?;
        let mut root_editor = ItemEditor::new(Some(root), NewItemProps::group(&props.survey_key));
        root_editor.set_selection_method(Some(Expression::named("sequential")));
        editor.update_item(root_editor.into_item())?;

        Ok(Self {
            key: props.survey_key,
            editor,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn editor(&self) -> &SurveyEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SurveyEditor {
        &mut self.editor
    }

    /// Appends `item` to the survey root, optionally followed by a page break.
    pub fn add_item(&mut self, item: SurveyItem, page_break_after: bool) -> Result<(), BuildError> {
        self.editor.add_existing_item(item, &self.key, None)?;
        if page_break_after {
            self.add_page_break()?;
        }
        Ok(())
    }

    /// Appends a page break with a random key not used in the survey yet.
    pub fn add_page_break(&mut self) -> Result<(), BuildError> {
        let page_break = loop {
            let candidate = generate_page_break(&self.key, None);
            if !self.editor.contains(candidate.key()) {
                break candidate;
            }
        };
        self.editor.add_existing_item(page_break, &self.key, None)?;
        Ok(())
    }

    pub fn add_survey_item_to_path(
        &mut self,
        item: SurveyItem,
        parent_key: &str,
    ) -> Result<(), BuildError> {
        self.editor.add_existing_item(item, parent_key, None)?;
        Ok(())
    }

    /// Snapshot of the survey after the duplicate-key sweep.
    pub fn finish(&self) -> Result<Survey, BuildError> {
        checked(self.editor.get_survey())
    }
}

impl SurveyDefinition for SurveyScaffold {
    fn survey_key(&self) -> &str {
        &self.key
    }

    fn build_survey(&self) -> Result<Survey, BuildError> {
        self.finish()
    }
}

impl SurveyDefinition for Survey {
    fn survey_key(&self) -> &str {
        self.key()
    }

    fn build_survey(&self) -> Result<Survey, BuildError> {
        checked(self.clone())
    }
}

fn checked(survey: Survey) -> Result<Survey, BuildError> {
    let duplicates = check_duplicate_child_keys(&survey);
    if duplicates.is_empty() {
        return Ok(survey);
    }
    error!(
        survey = survey.key(),
        count = duplicates.len(),
        "survey contains duplicate keys"
    );
    Err(BuildError::DuplicateKeys {
        survey_key: survey.key().to_string(),
        duplicates,
    })
}
