#![allow(missing_docs)]

pub mod duplicates;
pub mod duration;
pub mod editor;
pub mod engine;
pub mod error;
pub mod expr;
pub mod generators;
pub mod key_path;
pub mod keys;
pub mod rules;
pub mod simple_question;
pub mod spec;

pub use duplicates::{DuplicateKeyReport, check_duplicate_child_keys, check_duplicate_keys_deep};
pub use duration::Duration;
pub use editor::{
    ComponentEditor, DEFAULT_SURVEY_KEY, ItemEditor, NewComponentProps, NewItemProps,
    ReferencePolicy, SurveyEditor,
};
pub use error::{EditorError, Severity};
pub use expr::{Expression, ExpressionArg, ReturnType, arg, build_expression, opt_arg};
pub use generators::{
    DateDisplay, ExpressionDisplay, HelpItem, StyledText, TitleContent, TitlePart, Translations,
    generate_loc_strings, generate_page_break, generate_title_component, translations,
};
pub use key_path::{child_key, key_prefixes, local_key, parent_key};
pub use rules::{EventKind, StudyRules};
pub use simple_question::SimpleQuestionEditor;
pub use spec::{
    ConfidentialMode, ItemComponent, LocalizedString, MaxItemsPerPage, StyleEntry, Survey,
    SurveyAvailableFor, SurveyContextDef, SurveyGroupItem, SurveyItem, SurveyProps,
    SurveySingleItem, Validation, ValidationKind,
};
