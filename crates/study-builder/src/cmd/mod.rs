use std::fs;
use std::path::Path;

use study_spec::Survey;

use crate::error::BuildError;

pub mod check;
pub mod export;
pub mod rekey;
pub mod schema;

pub(crate) fn load_survey(path: &Path) -> Result<Survey, BuildError> {
    let raw = fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| BuildError::Parse {
        path: path.to_path_buf(),
        what: "survey",
        source,
    })
}
