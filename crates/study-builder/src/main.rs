use tracing::error;

fn main() {
    if let Err(err) = study_builder::cli::main() {
        error!("{err:#}");
        std::process::exit(1);
    }
}
