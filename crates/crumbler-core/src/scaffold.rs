//! Entity creation. Every new entity starts `open`; goals also get a name.

use crate::config::Config;
use crate::error::{CrumblerError, ErrorKind, Result, ValidationError};
use crate::io;
use crate::paths;
use crate::status;
use crate::transition;
use crate::types::{EntityKind, Status};
use std::path::{Path, PathBuf};

/// Create `.crumbler/phases/` and a default config. Idempotent.
/// Returns true if the project was not initialised before.
pub fn init(root: &Path) -> Result<bool> {
    let fresh = !paths::phases_dir(root).is_dir();
    io::ensure_dir(&paths::phases_dir(root))?;
    let config = serde_yaml::to_string(&Config::default())?;
    io::write_if_missing(&paths::config_path(root), config.as_bytes())?;
    if fresh {
        tracing::info!(root = %root.display(), "initialised crumbler project");
    }
    Ok(fresh)
}

pub fn create_phase(root: &Path) -> Result<PathBuf> {
    let container = paths::phases_dir(root);
    if !container.is_dir() {
        return Err(CrumblerError::NotInitialized);
    }
    allocate(root, &container, EntityKind::Phase, None)
}

pub fn create_sprint(root: &Path, phase: &Path) -> Result<PathBuf> {
    create_child(root, phase, EntityKind::Sprint, None)
}

pub fn create_ticket(root: &Path, sprint: &Path) -> Result<PathBuf> {
    create_child(root, sprint, EntityKind::Ticket, None)
}

/// Create a goal under a phase, sprint or ticket.
pub fn create_goal(root: &Path, parent: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrumblerError::EmptyGoalName);
    }
    create_child(root, parent, EntityKind::Goal, Some(name))
}

fn create_child(
    root: &Path,
    parent: &Path,
    kind: EntityKind,
    name: Option<&str>,
) -> Result<PathBuf> {
    let parent_kind = EntityKind::of_dir(parent)
        .filter(|k| k.can_contain(kind) && parent.is_dir())
        .ok_or_else(|| CrumblerError::NotAnEntity {
            expected: parent_kinds(kind),
            path: parent.to_path_buf(),
        })?;

    let parent_status = status::get_status(root, parent)?;
    if parent_status != Status::Open {
        let rel = paths::relative(root, parent);
        return Err(ValidationError::new(
            ErrorKind::InvalidTransition,
            format!("cannot add a {kind} to {parent_kind} {rel}: it is {parent_status}"),
        )
        .with_path(rel)
        .with_fix(format!("{kind}s can only be added to an open {parent_kind}"))
        .into());
    }

    allocate(root, &paths::children_dir(parent, kind), kind, name)
}

/// Build the entity in a staging directory next to its final place, then
/// rename it in. The staging name never matches an entity pattern, and the
/// staging directory is removed if any step fails.
fn allocate(
    root: &Path,
    container: &Path,
    kind: EntityKind,
    name: Option<&str>,
) -> Result<PathBuf> {
    io::ensure_dir(container)?;
    let index = paths::next_index(container, kind)?;
    let dir = container.join(kind.dir_name(index));

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(container)?;
    transition::set_open_validated(root, staging.path())?;
    if let Some(name) = name {
        io::atomic_write(&paths::goal_name_path(staging.path()), name.as_bytes())?;
    }

    if dir.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", dir.display()),
        )
        .into());
    }
    std::fs::rename(staging.path(), &dir)?;
    // The staging path is gone; dropping the guard is a no-op.
    drop(staging);

    tracing::info!(entity = %paths::relative(root, &dir), "created {kind}");
    Ok(dir)
}

const STAGING_PREFIX: &str = ".staging-";

fn parent_kinds(child: EntityKind) -> String {
    let names: Vec<&str> = EntityKind::all()
        .iter()
        .filter(|k| k.can_contain(child))
        .map(|k| k.as_str())
        .collect();
    names.join(" or ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
