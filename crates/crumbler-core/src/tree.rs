//! Read-only snapshot of the hierarchy for status reporting.
//!
//! Defects do not abort the snapshot: a conflicting entity is reported with
//! `conflict: true`, a missing marker as `Status::Unknown`.

use crate::entity;
use crate::error::{CrumblerError, Result};
use crate::paths;
use crate::status;
use crate::types::{EntityKind, Status};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityNode {
    pub kind: EntityKind,
    pub index: u32,
    pub path: String,
    pub status: Status,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityNode>,
}

impl EntityNode {
    /// Depth-first iterator over this node and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &EntityNode> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

pub fn load_tree(root: &Path) -> Result<Vec<EntityNode>> {
    if !paths::phases_dir(root).is_dir() {
        return Err(CrumblerError::NotInitialized);
    }
    paths::list_phases(root)?
        .iter()
        .map(|p| load_node(root, p, EntityKind::Phase))
        .collect()
}

fn load_node(root: &Path, dir: &Path, kind: EntityKind) -> Result<EntityNode> {
    let (status, conflict) = match status::read_status(root, dir) {
        Ok(s) => (s, false),
        Err(CrumblerError::Validation(_)) => (Status::Unknown, true),
        Err(e) => return Err(e),
    };
    let index = dir
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(EntityKind::parse_dir_name)
        .map(|(_, i)| i)
        .unwrap_or(0);
    let name = if kind == EntityKind::Goal {
        entity::read_goal_name(dir)?
    } else {
        None
    };

    let mut children = Vec::new();
    for &child_kind in kind.child_kinds() {
        for child in paths::list_children(dir, child_kind)? {
            children.push(load_node(root, &child, child_kind)?);
        }
    }

    Ok(EntityNode {
        kind,
        index,
        path: paths::relative(root, dir),
        status,
        conflict,
        name,
        children,
    })
}

/// The work currently in progress: first open phase, its first open sprint,
/// and that sprint's first open ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Current {
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
}

pub fn current(root: &Path) -> Result<Option<Current>> {
    if !paths::phases_dir(root).is_dir() {
        return Err(CrumblerError::NotInitialized);
    }
    let Some(phase) = first_open(root, paths::list_phases(root)?) else {
        return Ok(None);
    };
    let sprint = first_open(root, paths::list_children(&phase, EntityKind::Sprint)?);
    let ticket = match &sprint {
        Some(s) => first_open(root, paths::list_children(s, EntityKind::Ticket)?),
        None => None,
    };
    Ok(Some(Current {
        phase: paths::relative(root, &phase),
        sprint: sprint.map(|s| paths::relative(root, &s)),
        ticket: ticket.map(|t| paths::relative(root, &t)),
    }))
}

fn first_open(root: &Path, dirs: Vec<std::path::PathBuf>) -> Option<std::path::PathBuf> {
    dirs.into_iter()
        .find(|d| status::is_status(root, d, Status::Open))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
