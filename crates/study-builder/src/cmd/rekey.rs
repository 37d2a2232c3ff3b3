use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use study_spec::{ReferencePolicy, SurveyEditor};
use tracing::info;

use super::load_survey;

#[derive(Args, Debug, Clone)]
pub struct RekeyArgs {
    #[arg(long, value_name = "survey.json")]
    pub survey: PathBuf,
    #[arg(long, value_name = "KEY")]
    pub from: String,
    #[arg(long, value_name = "KEY")]
    pub to: String,
    /// Leave expression arguments and `follows` entries untouched
    #[arg(long = "ignore-references", default_value_t = false)]
    pub ignore_references: bool,
    /// Write the result here instead of stdout
    #[arg(long, value_name = "survey.json")]
    pub out: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

pub fn run(args: RekeyArgs) -> Result<()> {
    let survey = load_survey(&args.survey)?;
    let mut editor = SurveyEditor::from_survey(survey)
        .with_context(|| format!("rekey: cannot edit {}", args.survey.display()))?;
    let references = if args.ignore_references {
        ReferencePolicy::Ignore
    } else {
        ReferencePolicy::Rewrite
    };
    editor.change_item_key(&args.from, &args.to, references)?;
    let json = editor
        .get_survey_json(args.pretty)
        .context("rekey: failed to serialize survey")?;
    match args.out {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("rekey: failed to write {}", path.display()))?;
            info!(from = %args.from, to = %args.to, out = %path.display(), "survey rekeyed");
        }
        None => println!("{json}"),
    }
    Ok(())
}
