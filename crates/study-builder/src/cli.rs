use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, check::CheckArgs, export::ExportArgs, rekey::RekeyArgs, schema::SchemaArgs,
};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "study-builder",
    about = "Assemble and export study surveys, rules and message configs",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write all files of a study bundle
    Export(ExportArgs),
    /// Look for item keys used twice in a survey
    Check(CheckArgs),
    /// Rename a survey item and its descendants
    Rekey(RekeyArgs),
    /// Print a JSON schema
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export(args) => cmd::export::run(args),
        Commands::Check(args) => cmd::check::run(args),
        Commands::Rekey(args) => cmd::rekey::run(args),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rekey_flags() {
        let cli = Cli::try_parse_from([
            "study-builder",
            "rekey",
            "--survey",
            "weekly.json",
            "--from",
            "weekly.q1",
            "--to",
            "weekly.q9",
            "--ignore-references",
        ])
        .expect("parse");
        let Commands::Rekey(args) = cli.command else {
            panic!("expected rekey");
        };
        assert!(args.ignore_references);
        assert_eq!(args.to, "weekly.q9");
    }
}
