pub mod component;
pub mod item;
pub mod survey;

pub use component::{ComponentEditor, NewComponentProps, RESPONSE_GROUP_ROLE};
pub use item::{ItemEditor, NewItemProps, ROOT_COMPONENT_ROLE, TITLE_ROLE};
pub use survey::{DEFAULT_SURVEY_KEY, ReferencePolicy, SurveyEditor};
