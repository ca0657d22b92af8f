//! Status oracle: the single place where marker filenames become a [`Status`].

use crate::error::{ErrorKind, Result, ValidationError};
use crate::paths;
use crate::types::Status;
use std::path::Path;

/// Read the status of the entity at `dir`.
///
/// Exactly one marker must be present. Two or more fail with
/// `MutuallyExclusiveState` naming every marker found; none fails with
/// `OrphanedState`. Never touches the filesystem beyond `stat` calls.
pub fn get_status(root: &Path, dir: &Path) -> Result<Status> {
    match read_status(root, dir)? {
        Status::Unknown => Err(no_marker(root, dir).into()),
        status => Ok(status),
    }
}

/// Like [`get_status`], but returns `Status::Unknown` instead of failing when
/// no marker is present. Conflicts still fail.
pub fn read_status(root: &Path, dir: &Path) -> Result<Status> {
    let present: Vec<Status> = Status::markers()
        .iter()
        .copied()
        .filter(|s| paths::marker_path(dir, *s).is_some_and(|p| p.is_file()))
        .collect();

    tracing::debug!(dir = %dir.display(), markers = ?present, "read status markers");

    match present.as_slice() {
        [] => Ok(Status::Unknown),
        [only] => Ok(*only),
        many => Err(conflict(root, dir, many).into()),
    }
}

/// Whether the entity at `dir` is in `status`. Unreadable status counts as no.
pub fn is_status(root: &Path, dir: &Path, status: Status) -> bool {
    matches!(get_status(root, dir), Ok(s) if s == status)
}

pub(crate) fn conflict(root: &Path, dir: &Path, present: &[Status]) -> ValidationError {
    let names: Vec<&str> = present.iter().map(|s| s.as_str()).collect();
    ValidationError::new(
        ErrorKind::MutuallyExclusiveState,
        format!(
            "{} has conflicting status markers: {}",
            paths::relative(root, dir),
            names.join(", ")
        ),
    )
    .with_paths(
        present
            .iter()
            .filter_map(|s| paths::marker_path(dir, *s))
            .map(|p| paths::relative(root, &p)),
    )
    .with_fix("remove one of the conflicting files so exactly one status marker remains")
}

pub(crate) fn no_marker(root: &Path, dir: &Path) -> ValidationError {
    ValidationError::new(
        ErrorKind::OrphanedState,
        format!("{} has no status marker", paths::relative(root, dir)),
    )
    .with_path(paths::relative(root, dir))
    .with_fix("create an 'open' marker file in the directory")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{snapshot, Tree};
    use crate::types::EntityKind;

    #[test]
    fn single_marker_is_the_status() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Closed);
        let sprint = tree.child(&phase, EntityKind::Sprint, 1, Status::Open);
        let ticket = tree.child(&sprint, EntityKind::Ticket, 1, Status::Done);
        assert_eq!(get_status(tree.root(), &phase).unwrap(), Status::Closed);
        assert_eq!(get_status(tree.root(), &sprint).unwrap(), Status::Open);
        assert_eq!(get_status(tree.root(), &ticket).unwrap(), Status::Done);
    }

    #[test]
    fn conflicting_markers_name_both_files() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Open);
        tree.add_marker(&phase, Status::Closed);

        let err = get_status(tree.root(), &phase).unwrap_err();
        let v = err.as_validation().unwrap();
        assert_eq!(v.kind, ErrorKind::MutuallyExclusiveState);
        assert!(v.paths.contains(&"phases/0001-phase/open".to_string()));
        assert!(v.paths.contains(&"phases/0001-phase/closed".to_string()));
        assert!(v.message.contains("phases/0001-phase"));
        assert!(!v.fix.is_empty());
    }

    #[test]
    fn three_markers_all_reported() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Open);
        tree.add_marker(&phase, Status::Closed);
        tree.add_marker(&phase, Status::Done);
        let err = read_status(tree.root(), &phase).unwrap_err();
        assert_eq!(err.as_validation().unwrap().paths.len(), 3);
    }

    #[test]
    fn no_marker_is_orphaned_not_defaulted() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Unknown);
        let err = get_status(tree.root(), &phase).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::OrphanedState));
        assert_eq!(read_status(tree.root(), &phase).unwrap(), Status::Unknown);
    }

    #[test]
    fn directory_named_like_a_marker_is_not_a_marker() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Open);
        std::fs::create_dir_all(phase.join("closed")).unwrap();
        assert_eq!(get_status(tree.root(), &phase).unwrap(), Status::Open);
    }

    #[test]
    fn repeated_reads_are_stable_and_read_only() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Open);
        tree.child(&phase, EntityKind::Goal, 1, Status::Closed);
        let before = snapshot(tree.root());
        for _ in 0..5 {
            assert_eq!(get_status(tree.root(), &phase).unwrap(), Status::Open);
        }
        assert_eq!(snapshot(tree.root()), before);
    }

    #[test]
    fn is_status_swallows_errors() {
        let tree = Tree::new();
        let phase = tree.phase(1, Status::Open);
        assert!(is_status(tree.root(), &phase, Status::Open));
        tree.add_marker(&phase, Status::Closed);
        assert!(!is_status(tree.root(), &phase, Status::Open));
    }
}
