use thiserror::Error;

/// How an authoring error should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Addressing integrity is lost; artifact generation must stop.
    Fatal,
    /// The tree is unchanged and the build can continue.
    Recoverable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("duplicate key in survey: {key}")]
    DuplicateKey { key: String },
    #[error("duplicate component key '{key}' in '{group}'")]
    DuplicateComponentKey { group: String, key: String },
    #[error("survey item cannot be found: {key}")]
    ItemNotFound { key: String },
    #[error("parent survey item cannot be found: {key}")]
    ParentNotFound { key: String },
    #[error("survey item is not a group: {key}")]
    NotAGroup { key: String },
    #[error("component cannot be found: {key}")]
    ComponentNotFound { key: String },
    #[error("component is not a group: {key}")]
    ComponentNotAGroup { key: String },
    #[error("the survey root '{key}' cannot be removed")]
    RootRemoval { key: String },
    #[error("cannot move '{key}' into its own subtree '{destination}'")]
    MoveIntoSelf { key: String, destination: String },
    #[error("key '{key}' is not a direct child key of '{parent}'")]
    KeyOutsideParent { key: String, parent: String },
}

impl EditorError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateKey { .. } | Self::DuplicateComponentKey { .. } => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
