use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Tag carried by every [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Two or more status markers coexist in one directory.
    MutuallyExclusiveState,
    /// The requested transition is not reachable from the current status, or
    /// a precondition on children is unmet.
    InvalidTransition,
    /// A closed/done entity has a child that is not correspondingly closed/done.
    HierarchyConstraint,
    /// A goal directory has no `name` payload.
    MissingGoalName,
    /// The hierarchy directory is missing, or an entity has no valid marker.
    OrphanedState,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MutuallyExclusiveState => "mutually_exclusive_state",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::HierarchyConstraint => "hierarchy_constraint",
            ErrorKind::MissingGoalName => "missing_goal_name",
            ErrorKind::OrphanedState => "orphaned_state",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Structured validation failure shared by the status oracle, the transition
/// validator, the entity validators and the hierarchy walk.
///
/// `paths` are relative to the `.crumbler/` directory (see
/// [`crate::paths::relative`]). `fix` is plain text meant to be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
    pub paths: Vec<String>,
    pub fix: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            paths: Vec::new(),
            fix: String::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = fix.into();
        self
    }
}

// ---------------------------------------------------------------------------
// CrumblerError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CrumblerError {
    #[error("not initialized: run 'crumbler init'")]
    NotInitialized,

    #[error("not a {expected} directory: {path}")]
    NotAnEntity { expected: String, path: PathBuf },

    #[error("invalid entity reference '{0}': expected a path like phases/0001-phase/sprints/0001-sprint")]
    InvalidEntityRef(String),

    #[error("invalid status '{0}': expected open, closed or done")]
    InvalidStatus(String),

    #[error("no free {kind} index left in {container}: the highest index is {max}")]
    IndexExhausted {
        kind: String,
        container: PathBuf,
        max: u32,
    },

    #[error("goal name must not be empty")]
    EmptyGoalName,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl CrumblerError {
    /// The validation tag, if this is a validation failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CrumblerError::Validation(v) => Some(v.kind),
            _ => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CrumblerError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrumblerError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
