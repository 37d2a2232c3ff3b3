use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::export::{ExportOptions, FsSink, export_study};
use crate::study::{Study, StudyBundle};

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long, value_name = "bundle.json")]
    pub study: PathBuf,
    /// Output folder [default: ./output/<outputFolderName|studyKey>]
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let study = Study::from(StudyBundle::from_path(&args.study)?);
    let options = ExportOptions {
        output_root: args.out,
        pretty: args.pretty,
    };
    let report = export_study(&study, &mut FsSink, &options)?;
    if report.failed.is_empty() {
        info!(
            root = %report.output_root.display(),
            files = report.written.len(),
            "export finished"
        );
    } else {
        warn!(
            root = %report.output_root.display(),
            written = report.written.len(),
            failed = report.failed.len(),
            "export finished with failed files"
        );
    }
    Ok(())
}
