//! Diagnostics over the whole tree. Same traversal as
//! [`crate::hierarchy::validate_hierarchy`], but never stops early.

use crate::entity::ValidationOptions;
use crate::error::{ErrorKind, Result, ValidationError};
use crate::hierarchy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::Path;

/// Every entity-level and hierarchy defect in the tree, in traversal order.
/// An empty list means the tree is valid.
pub fn collect_all_errors(root: &Path) -> Result<Vec<ValidationError>> {
    collect_all_errors_with(root, &ValidationOptions::default())
}

pub fn collect_all_errors_with(
    root: &Path,
    opts: &ValidationOptions,
) -> Result<Vec<ValidationError>> {
    let mut errors = Vec::new();
    let _ = hierarchy::walk(root, opts, &mut |err: ValidationError| {
        tracing::debug!(kind = %err.kind, "collected: {}", err.message);
        errors.push(err);
        ControlFlow::Continue(())
    })?;
    if !errors.is_empty() {
        tracing::warn!(count = errors.len(), "hierarchy has defects");
    }
    Ok(errors)
}

/// Errors grouped by kind, for summary output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub errors: Vec<ValidationError>,
    pub counts: BTreeMap<String, usize>,
}

impl Report {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        let mut counts = BTreeMap::new();
        for e in &errors {
            *counts.entry(e.kind.to_string()).or_insert(0) += 1;
        }
        Self { errors, counts }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.counts.get(kind.as_str()).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Tree;
    use crate::types::{EntityKind, Status};

    #[test]
    fn valid_tree_has_no_errors() {
        let tree = Tree::new();
        let p = tree.phase(1, Status::Closed);
        tree.child(&p, EntityKind::Goal, 1, Status::Closed);
        let s = tree.child(&p, EntityKind::Sprint, 1, Status::Closed);
        tree.child(&s, EntityKind::Ticket, 1, Status::Done);
        tree.phase(2, Status::Open);
        assert!(collect_all_errors(tree.root()).unwrap().is_empty());
    }

    #[test]
    fn one_conflict_and_one_hierarchy_defect() {
        let tree = Tree::new();
        let p1 = tree.phase(1, Status::Closed);
        tree.child(&p1, EntityKind::Sprint, 1, Status::Open);

        let p2 = tree.phase(2, Status::Open);
        tree.add_marker(&p2, Status::Closed);

        let errors = collect_all_errors(tree.root()).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ErrorKind::HierarchyConstraint);
        assert_eq!(errors[1].kind, ErrorKind::MutuallyExclusiveState);
    }

    #[test]
    fn collects_across_every_level() {
        let tree = Tree::new();
        let p = tree.phase(1, Status::Open);
        tree.unnamed_goal(&p, 1, Status::Open);
        let s = tree.child(&p, EntityKind::Sprint, 1, Status::Closed);
        tree.child(&s, EntityKind::Ticket, 1, Status::Open);
        let t = tree.child(&s, EntityKind::Ticket, 2, Status::Done);
        tree.child(&t, EntityKind::Goal, 1, Status::Open);
        tree.child(&t, EntityKind::Goal, 2, Status::Unknown);

        let report = Report::new(collect_all_errors(tree.root()).unwrap());
        assert_eq!(report.count(ErrorKind::MissingGoalName), 1);
        // Open ticket under the closed sprint, open goal under the done ticket.
        assert_eq!(report.count(ErrorKind::HierarchyConstraint), 2);
        assert_eq!(report.count(ErrorKind::OrphanedState), 1);
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn unreadable_child_is_reported_once() {
        let tree = Tree::new();
        let p = tree.phase(1, Status::Closed);
        let s = tree.child(&p, EntityKind::Sprint, 1, Status::Open);
        tree.add_marker(&s, Status::Closed);

        let errors = collect_all_errors(tree.root()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MutuallyExclusiveState);
    }

    #[test]
    fn missing_root_yields_single_orphaned_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let errors = collect_all_errors(dir.path()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::OrphanedState);
    }

    #[test]
    fn goal_names_optional() {
        let tree = Tree::new();
        let p = tree.phase(1, Status::Open);
        tree.unnamed_goal(&p, 1, Status::Open);
        let opts = ValidationOptions {
            require_goal_names: false,
        };
        assert!(collect_all_errors_with(tree.root(), &opts).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_container_keeps_earlier_errors() {
        use std::os::unix::fs::PermissionsExt;

        let tree = Tree::new();
        let p1 = tree.phase(1, Status::Closed);
        tree.child(&p1, EntityKind::Sprint, 1, Status::Open);
        let p2 = tree.phase(2, Status::Open);
        let s2 = tree.child(&p2, EntityKind::Sprint, 1, Status::Open);
        let sprints = s2.parent().unwrap().to_path_buf();

        std::fs::set_permissions(&sprints, std::fs::Permissions::from_mode(0o000)).unwrap();
        let readable = std::fs::read_dir(&sprints).is_ok();
        let errors = collect_all_errors(tree.root());
        std::fs::set_permissions(&sprints, std::fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            // Permission bits do not apply to this user (e.g. root).
            return;
        }

        let errors = errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ErrorKind::HierarchyConstraint);
        assert_eq!(errors[1].kind, ErrorKind::OrphanedState);
        assert_eq!(errors[1].paths, vec!["phases/0002-phase/sprints".to_string()]);
        assert!(errors[1].message.starts_with("cannot read"));
    }
}
