use std::path::PathBuf;

use study_spec::{DuplicateKeyReport, EditorError};
use thiserror::Error;

/// Errors raised while assembling a study.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("survey `{survey_key}` contains duplicate item keys: {}", list(.duplicates))]
    DuplicateKeys {
        survey_key: String,
        duplicates: Vec<DuplicateKeyReport>,
    },
    #[error("failed to serialize {what}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid {what}", .path.display())]
    Parse {
        path: PathBuf,
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    /// Fatal errors stop the whole export.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Editor(err) => err.is_fatal(),
            Self::DuplicateKeys { .. } | Self::Serialize { .. } | Self::Parse { .. } => true,
            Self::Read { .. } => false,
        }
    }
}

fn list(duplicates: &[DuplicateKeyReport]) -> String {
    duplicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_report_lists_every_clash() {
        let err = BuildError::DuplicateKeys {
            survey_key: "weekly".into(),
            duplicates: vec![DuplicateKeyReport {
                key: "weekly.q1".into(),
                parent_key: "weekly".into(),
                first_index: 0,
                duplicate_index: 2,
            }],
        };
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "survey `weekly` contains duplicate item keys: \
             weekly.q1 is used twice (at index 0 and at index 2)"
        );
    }

    #[test]
    fn editor_severity_carries_over() {
        let missing: BuildError = EditorError::ItemNotFound { key: "s.q".into() }.into();
        assert!(!missing.is_fatal());
        let duplicate: BuildError = EditorError::DuplicateKey { key: "s.q".into() }.into();
        assert!(duplicate.is_fatal());
    }
}
