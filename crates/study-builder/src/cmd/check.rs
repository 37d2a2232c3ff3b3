use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use study_spec::{check_duplicate_child_keys, check_duplicate_keys_deep};

use super::load_survey;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, value_name = "survey.json")]
    pub survey: PathBuf,
    /// Check the children of every group, not only of the root
    #[arg(long, default_value_t = false)]
    pub deep: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let survey = load_survey(&args.survey)?;
    let duplicates = if args.deep {
        check_duplicate_keys_deep(&survey)
    } else {
        check_duplicate_child_keys(&survey)
    };
    if duplicates.is_empty() {
        println!("{}: no duplicate keys", survey.key());
        return Ok(());
    }
    for duplicate in &duplicates {
        println!("{duplicate}");
    }
    bail!(
        "survey {} contains {} duplicate key(s)",
        survey.key(),
        duplicates.len()
    )
}
