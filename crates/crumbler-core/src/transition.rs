//! Transition validator: checks the current status against the transition
//! table and swaps one marker file per call. No hierarchy checks happen here;
//! see [`crate::hierarchy`] for the closing gates.

use crate::error::{ErrorKind, Result, ValidationError};
use crate::io;
use crate::paths;
use crate::status;
use crate::types::{EntityKind, Status};
use std::path::Path;

/// `open -> closed` for phases, sprints and goals.
pub fn set_closed_validated(root: &Path, dir: &Path) -> Result<()> {
    transition(root, dir, Status::Closed)
}

/// `open -> done` for tickets.
pub fn set_done_validated(root: &Path, dir: &Path) -> Result<()> {
    transition(root, dir, Status::Done)
}

/// Initialise a freshly created entity with the `open` marker.
///
/// Only legal when the directory has no marker yet.
pub fn set_open_validated(root: &Path, dir: &Path) -> Result<()> {
    let current = status::read_status(root, dir)?;
    if current != Status::Unknown {
        return Err(invalid(root, dir, current, Status::Open).into());
    }
    let marker = dir.join(paths::OPEN_MARKER);
    io::atomic_write(&marker, b"")?;
    tracing::info!(entity = %paths::relative(root, dir), "initialised status: open");
    Ok(())
}

/// Whether `from -> to` is in the transition table for `kind`.
///
/// `kind` is `None` for directories whose name does not identify a kind, in
/// which case only the status pair is checked.
pub fn is_legal(kind: Option<EntityKind>, from: Status, to: Status) -> bool {
    if from != Status::Open || !matches!(to, Status::Closed | Status::Done) {
        return false;
    }
    kind.map_or(true, |k| k.completed_status() == to)
}

fn transition(root: &Path, dir: &Path, to: Status) -> Result<()> {
    let current = status::get_status(root, dir)?;
    let kind = EntityKind::of_dir(dir);
    if !is_legal(kind, current, to) {
        return Err(invalid(root, dir, current, to).into());
    }

    let (Some(old), Some(new)) = (
        paths::marker_path(dir, current),
        paths::marker_path(dir, to),
    ) else {
        return Err(invalid(root, dir, current, to).into());
    };
    io::remove_if_exists(&old)?;
    io::atomic_write(&new, b"")?;

    tracing::info!(
        entity = %paths::relative(root, dir),
        from = %current,
        to = %to,
        "status changed"
    );
    Ok(())
}

fn invalid(root: &Path, dir: &Path, from: Status, to: Status) -> ValidationError {
    let rel = paths::relative(root, dir);
    let kind = EntityKind::of_dir(dir);
    let fix = match (kind, to) {
        (Some(EntityKind::Ticket), Status::Closed) => {
            "tickets are completed with 'done', not 'closed'".to_string()
        }
        (Some(k), Status::Done) if k != EntityKind::Ticket => {
            format!("a {k} is completed with 'closed', not 'done'")
        }
        _ if from == to => format!("{rel} is already {to}; nothing to do"),
        _ => format!("only open entities can move to {to}; status changes are one-way"),
    };
    ValidationError::new(
        ErrorKind::InvalidTransition,
        format!("invalid transition for {rel}: {from} -> {to}"),
    )
    .with_path(rel)
    .with_fix(fix)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
