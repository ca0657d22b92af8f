//! Entity-level validation: one directory at a time, fail fast.

use crate::error::{CrumblerError, ErrorKind, Result, ValidationError};
use crate::paths;
use crate::status;
use crate::types::{EntityKind, Status};
use std::path::Path;

/// Knobs shared by the entity validators and the hierarchy walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Report goals without a `name` payload.
    pub require_goal_names: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_goal_names: true,
        }
    }
}

pub fn validate_phase(root: &Path, dir: &Path) -> Result<()> {
    validate_entity(root, dir, EntityKind::Phase, &ValidationOptions::default()).map(|_| ())
}

pub fn validate_sprint(root: &Path, dir: &Path) -> Result<()> {
    validate_entity(root, dir, EntityKind::Sprint, &ValidationOptions::default()).map(|_| ())
}

pub fn validate_ticket(root: &Path, dir: &Path) -> Result<()> {
    validate_entity(root, dir, EntityKind::Ticket, &ValidationOptions::default()).map(|_| ())
}

pub fn validate_goal(root: &Path, dir: &Path) -> Result<()> {
    validate_entity(root, dir, EntityKind::Goal, &ValidationOptions::default()).map(|_| ())
}

/// Check the marker set of `dir` for `kind` and, for goals, the name payload.
///
/// Returns the status on success so callers need not read it twice.
pub fn validate_entity(
    root: &Path,
    dir: &Path,
    kind: EntityKind,
    opts: &ValidationOptions,
) -> Result<Status> {
    let status = status::read_status(root, dir)?;
    if status == Status::Unknown {
        return Err(status::no_marker(root, dir).into());
    }
    if !kind.allows(status) {
        return Err(foreign_marker(root, dir, kind, status).into());
    }
    if kind == EntityKind::Goal && opts.require_goal_names && !has_goal_name(dir) {
        return Err(missing_goal_name(root, dir).into());
    }
    Ok(status)
}

/// Run [`validate_entity`] and split structured failures from I/O failures.
///
/// `Ok(Err(v))` is a validation defect; `Err(_)` is anything else.
pub(crate) fn check_entity(
    root: &Path,
    dir: &Path,
    kind: EntityKind,
    opts: &ValidationOptions,
) -> Result<std::result::Result<Status, ValidationError>> {
    match validate_entity(root, dir, kind, opts) {
        Ok(status) => Ok(Ok(status)),
        Err(CrumblerError::Validation(v)) => Ok(Err(v)),
        Err(e) => Err(e),
    }
}

pub fn has_goal_name(dir: &Path) -> bool {
    paths::goal_name_path(dir).is_file()
}

/// Read a goal's name payload, trimmed. `None` if absent.
pub fn read_goal_name(dir: &Path) -> Result<Option<String>> {
    let path = paths::goal_name_path(dir);
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn foreign_marker(root: &Path, dir: &Path, kind: EntityKind, status: Status) -> ValidationError {
    let rel = paths::relative(root, dir);
    let marker = paths::marker_path(dir, status)
        .map(|p| paths::relative(root, &p))
        .unwrap_or_else(|| rel.clone());
    ValidationError::new(
        ErrorKind::OrphanedState,
        format!("{rel} carries a '{status}' marker, which is not a valid {kind} status"),
    )
    .with_path(marker)
    .with_fix(format!(
        "replace it with '{}' or '{}'",
        Status::Open,
        kind.completed_status()
    ))
}

fn missing_goal_name(root: &Path, dir: &Path) -> ValidationError {
    let rel = paths::relative(root, dir);
    ValidationError::new(ErrorKind::MissingGoalName, format!("goal {rel} has no name"))
        .with_path(rel)
        .with_fix(format!(
            "write the goal's name into a '{}' file in the goal directory",
            paths::GOAL_NAME_FILE
        ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
