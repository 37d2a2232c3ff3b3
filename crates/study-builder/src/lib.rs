#![allow(missing_docs)]

pub mod cli;
pub mod cmd;
pub mod error;
pub mod export;
pub mod logging;
pub mod message_config;
pub mod scaffold;
pub mod study;

pub use error::BuildError;
pub use export::{
    ExportOptions, ExportPlan, ExportReport, FileSink, FsSink, execute_export, export_study,
    plan_export,
};
pub use message_config::{MessageConfig, MessageTemplate, build_message_config};
pub use scaffold::{SurveyDefinition, SurveyProps, SurveyScaffold};
pub use study::{CustomStudyRule, Study, StudyBundle};
