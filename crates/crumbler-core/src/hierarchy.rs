//! Cross-level consistency: the full-tree walk and the pre-transition gates.
//!
//! A closed phase may only hold closed sprints and closed goals, a closed
//! sprint only done tickets and closed goals, a done ticket only closed goals.
//! The gates apply the same rule before a transition; the walk re-checks it
//! for trees edited by hand.

use crate::entity::{self, ValidationOptions};
use crate::error::{CrumblerError, ErrorKind, Result, ValidationError};
use crate::paths;
use crate::status;
use crate::types::{EntityKind, Status};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Full-tree walk
// ---------------------------------------------------------------------------

/// Walk the whole tree and return the first violation in traversal order.
pub fn validate_hierarchy(root: &Path) -> Result<()> {
    validate_hierarchy_with(root, &ValidationOptions::default())
}

pub fn validate_hierarchy_with(root: &Path, opts: &ValidationOptions) -> Result<()> {
    let mut first = None;
    let _ = walk(root, opts, &mut |err: ValidationError| {
        first = Some(err);
        ControlFlow::Break(())
    })?;
    match first {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// The parent an entity is visited under.
#[derive(Clone, Copy)]
struct Parent<'a> {
    dir: &'a Path,
    kind: EntityKind,
    /// `None` when the parent's own status was unreadable or invalid.
    status: Option<Status>,
}

/// Visit every entity under `root` in traversal order, handing each defect to
/// `report`. Stops as soon as `report` breaks.
///
/// Order: phases by index; within an entity, its goals first, then its work
/// children (sprints, tickets), each subtree depth-first.
pub(crate) fn walk<F>(
    root: &Path,
    opts: &ValidationOptions,
    report: &mut F,
) -> Result<ControlFlow<()>>
where
    F: FnMut(ValidationError) -> ControlFlow<()>,
{
    if !paths::phases_dir(root).is_dir() {
        return Ok(report(not_a_project()));
    }
    for phase in paths::list_phases(root)? {
        if visit(root, &phase, EntityKind::Phase, None, opts, report)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

fn visit<F>(
    root: &Path,
    dir: &Path,
    kind: EntityKind,
    parent: Option<Parent<'_>>,
    opts: &ValidationOptions,
    report: &mut F,
) -> Result<ControlFlow<()>>
where
    F: FnMut(ValidationError) -> ControlFlow<()>,
{
    tracing::debug!(entity = %paths::relative(root, dir), %kind, "visit");

    let checked = match entity::check_entity(root, dir, kind, opts) {
        Ok(checked) => checked,
        Err(err) => return Ok(report(unreadable(root, dir, &err))),
    };
    let status = match checked {
        Ok(status) => Some(status),
        Err(defect) => {
            // A goal without a name still has a usable status.
            let usable = defect.kind == ErrorKind::MissingGoalName;
            if report(defect).is_break() {
                return Ok(ControlFlow::Break(()));
            }
            if usable {
                status::get_status(root, dir).ok()
            } else {
                None
            }
        }
    };

    if let (Some(parent), Some(status)) = (parent, status) {
        if let Some(violation) = check_pair(root, parent, dir, kind, status) {
            if report(violation).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
    }

    let me = Parent { dir, kind, status };
    for &child_kind in kind.child_kinds() {
        let children = match paths::list_children(dir, child_kind) {
            Ok(children) => children,
            Err(err) => {
                let container = paths::children_dir(dir, child_kind);
                if report(unreadable(root, &container, &err)).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
                continue;
            }
        };
        for child in children {
            if visit(root, &child, child_kind, Some(me), opts, report)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// A completed parent requires every child to be completed too.
fn check_pair(
    root: &Path,
    parent: Parent<'_>,
    child: &Path,
    child_kind: EntityKind,
    child_status: Status,
) -> Option<ValidationError> {
    let parent_status = parent.status?;
    if parent_status != parent.kind.completed_status() {
        return None;
    }
    let required = child_kind.completed_status();
    if child_status == required {
        return None;
    }
    let parent_rel = paths::relative(root, parent.dir);
    let child_rel = paths::relative(root, child);
    Some(
        ValidationError::new(
            ErrorKind::HierarchyConstraint,
            format!(
                "{} {parent_rel} is {parent_status} but its {child_kind} {child_rel} is {child_status}",
                parent.kind
            ),
        )
        .with_paths([child_rel.clone(), parent_rel.clone()])
        .with_fix(format!(
            "mark {child_rel} as '{required}', or restore the 'open' marker on {parent_rel}"
        )),
    )
}

/// An entity or container the walk could not read. Reported like any other
/// defect so the rest of the tree is still checked.
fn unreadable(root: &Path, path: &Path, err: &CrumblerError) -> ValidationError {
    let rel = paths::relative(root, path);
    tracing::warn!(path = %rel, error = %err, "cannot read");
    ValidationError::new(ErrorKind::OrphanedState, format!("cannot read {rel}: {err}"))
        .with_path(rel)
        .with_fix("check the permissions and contents of this path")
}

fn not_a_project() -> ValidationError {
    ValidationError::new(
        ErrorKind::OrphanedState,
        format!("{} not found: this is not a crumbler project", paths::PHASES_DIR),
    )
    .with_path(paths::PHASES_DIR)
    .with_fix("run 'crumbler init' in the project root")
}

// ---------------------------------------------------------------------------
// Transition gates
// ---------------------------------------------------------------------------

/// Outcome of a transition gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    /// Blocked, with every offending path listed.
    Blocked(ValidationError),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Verdict::Allowed => None,
            Verdict::Blocked(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Verdict::Allowed => Ok(()),
            Verdict::Blocked(e) => Err(e.into()),
        }
    }
}

/// The phase is open and all of its sprints and goals are closed.
/// Vacuously true for a phase without sprints or goals.
pub fn can_close_phase(root: &Path, dir: &Path) -> Result<Verdict> {
    gate(root, dir, EntityKind::Phase)
}

/// The sprint is open, all of its tickets are done and all of its goals closed.
pub fn can_close_sprint(root: &Path, dir: &Path) -> Result<Verdict> {
    gate(root, dir, EntityKind::Sprint)
}

/// The ticket is open and all of its goals are closed.
pub fn can_mark_ticket_done(root: &Path, dir: &Path) -> Result<Verdict> {
    gate(root, dir, EntityKind::Ticket)
}

/// The goal is open. Goals have no children.
pub fn can_close_goal(root: &Path, dir: &Path) -> Result<Verdict> {
    gate(root, dir, EntityKind::Goal)
}

fn gate(root: &Path, dir: &Path, kind: EntityKind) -> Result<Verdict> {
    if EntityKind::of_dir(dir) != Some(kind) || !dir.is_dir() {
        return Err(CrumblerError::NotAnEntity {
            expected: kind.to_string(),
            path: dir.to_path_buf(),
        });
    }

    let rel = paths::relative(root, dir);
    let target = kind.completed_status();
    let current = match status::get_status(root, dir) {
        Ok(s) => s,
        Err(CrumblerError::Validation(v)) => return Ok(Verdict::Blocked(v)),
        Err(e) => return Err(e),
    };
    if current != Status::Open {
        return Ok(Verdict::Blocked(
            ValidationError::new(
                ErrorKind::InvalidTransition,
                format!("invalid transition for {rel}: {current} -> {target}"),
            )
            .with_path(rel)
            .with_fix(format!("only an open {kind} can be marked {target}")),
        ));
    }

    let offending = incomplete_children(root, dir, kind)?;
    if offending.is_empty() {
        tracing::debug!(entity = %rel, "gate passed");
        return Ok(Verdict::Allowed);
    }

    let listed: Vec<String> = offending.iter().map(|p| paths::relative(root, p)).collect();
    Ok(Verdict::Blocked(
        ValidationError::new(
            ErrorKind::InvalidTransition,
            format!(
                "cannot mark {kind} {rel} {target}: {} child {} not complete",
                listed.len(),
                if listed.len() == 1 { "is" } else { "are" }
            ),
        )
        .with_paths(listed)
        .with_fix(completion_hint(kind)),
    ))
}

/// Every direct child of `dir` that is not at its kind's completed status,
/// including children whose status cannot be read.
fn incomplete_children(root: &Path, dir: &Path, kind: EntityKind) -> Result<Vec<PathBuf>> {
    let mut offending = Vec::new();
    for &child_kind in kind.child_kinds() {
        for child in paths::list_children(dir, child_kind)? {
            match status::get_status(root, &child) {
                Ok(s) if s == child_kind.completed_status() => {}
                Ok(_) | Err(CrumblerError::Validation(_)) => offending.push(child),
                Err(e) => return Err(e),
            }
        }
    }
    Ok(offending)
}

fn completion_hint(kind: EntityKind) -> String {
    let parts: Vec<String> = kind
        .child_kinds()
        .iter()
        .map(|k| format!("{} must be {}", k.container(), k.completed_status()))
        .collect();
    format!("complete every listed entity first ({})", parts.join(", "))
}

// ---------------------------------------------------------------------------
// Goals-met queries
// ---------------------------------------------------------------------------

/// At least one sprint exists, every sprint is closed and every phase goal is
/// closed. Unlike [`can_close_phase`], zero sprints means not met.
pub fn phase_goals_met(root: &Path, dir: &Path) -> Result<bool> {
    goals_met(root, dir, EntityKind::Phase, EntityKind::Sprint)
}

/// At least one ticket exists, every ticket is done and every sprint goal is
/// closed.
pub fn sprint_goals_met(root: &Path, dir: &Path) -> Result<bool> {
    goals_met(root, dir, EntityKind::Sprint, EntityKind::Ticket)
}

fn goals_met(root: &Path, dir: &Path, kind: EntityKind, work: EntityKind) -> Result<bool> {
    if paths::list_children(dir, work)?.is_empty() {
        return Ok(false);
    }
    Ok(incomplete_children(root, dir, kind)?.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
