pub mod component;
pub mod item;
pub mod survey;

pub use component::{ItemComponent, LocalizedString, StyleEntry};
pub use item::{
    ConfidentialMode, SurveyGroupItem, SurveyItem, SurveySingleItem, Validation, ValidationKind,
};
pub use survey::{MaxItemsPerPage, Survey, SurveyAvailableFor, SurveyContextDef, SurveyProps};
