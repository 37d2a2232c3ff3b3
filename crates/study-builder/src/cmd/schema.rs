use anyhow::Result;
use clap::{Args, ValueEnum};
use schemars::schema_for;
use study_spec::{Expression, StudyRules, Survey};

use crate::study::StudyBundle;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Survey,
    Expression,
    StudyRules,
    StudyBundle,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, value_enum)]
    pub kind: SchemaKind,
}

pub fn schema_json(kind: SchemaKind) -> Result<String> {
    let schema = match kind {
        SchemaKind::Survey => schema_for!(Survey),
        SchemaKind::Expression => schema_for!(Expression),
        SchemaKind::StudyRules => schema_for!(StudyRules),
        SchemaKind::StudyBundle => schema_for!(StudyBundle),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

pub fn run(args: SchemaArgs) -> Result<()> {
    println!("{}", schema_json(args.kind)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_schema_names_the_root_group() {
        let json = schema_json(SchemaKind::Survey).expect("schema");
        assert!(json.contains("surveyDefinition"));
    }
}
