use crate::error::{CrumblerError, Result};
use crate::types::{EntityKind, Status};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CRUMBLER_DIR: &str = ".crumbler";
pub const PHASES_DIR: &str = ".crumbler/phases";
pub const CONFIG_FILE: &str = ".crumbler/config.yaml";

/// Reserved for cross-process locking. Nothing acquires it yet.
pub const LOCK_FILE: &str = ".crumbler/crumbler.lock";

pub const OPEN_MARKER: &str = "open";
pub const CLOSED_MARKER: &str = "closed";
pub const DONE_MARKER: &str = "done";

pub const GOAL_NAME_FILE: &str = "name";

/// Entity indices are four zero-padded digits.
pub const MAX_INDEX: u32 = 9999;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn crumbler_dir(root: &Path) -> PathBuf {
    root.join(CRUMBLER_DIR)
}

pub fn phases_dir(root: &Path) -> PathBuf {
    root.join(PHASES_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

pub fn phase_dir(root: &Path, index: u32) -> PathBuf {
    phases_dir(root).join(EntityKind::Phase.dir_name(index))
}

/// Container directory for children of `kind` under `entity`.
pub fn children_dir(entity: &Path, kind: EntityKind) -> PathBuf {
    entity.join(kind.container())
}

pub fn child_dir(entity: &Path, kind: EntityKind, index: u32) -> PathBuf {
    children_dir(entity, kind).join(kind.dir_name(index))
}

/// Path of the marker file for `status`. `None` for `Status::Unknown`.
pub fn marker_path(dir: &Path, status: Status) -> Option<PathBuf> {
    status.marker().map(|m| dir.join(m))
}

pub fn goal_name_path(goal: &Path) -> PathBuf {
    goal.join(GOAL_NAME_FILE)
}

/// Render `path` relative to the hierarchy directory (`phases/0001-phase/...`).
///
/// Falls back to the project root, then to the path as given.
pub fn relative(root: &Path, path: &Path) -> String {
    let crumbler = crumbler_dir(root);
    let Ok(rel) = path
        .strip_prefix(&crumbler)
        .or_else(|_| path.strip_prefix(root))
    else {
        return path.display().to_string();
    };
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a user-supplied entity reference (`phases/0001-phase/sprints/0002-sprint`)
/// to an absolute entity directory under `root`, returning its kind.
///
/// A leading `.crumbler/` is accepted. Every component pair must be a valid
/// container/entity step for the hierarchy.
pub fn resolve_entity_ref(root: &Path, reference: &str) -> Result<(EntityKind, PathBuf)> {
    let invalid = || CrumblerError::InvalidEntityRef(reference.to_string());

    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(reference.trim_end_matches('/')).components() {
        match component {
            Component::Normal(p) => parts.push(p.to_str().ok_or_else(invalid)?),
            Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }
    if parts.first() == Some(&CRUMBLER_DIR) {
        parts.remove(0);
    }
    if parts.is_empty() || parts.len() % 2 != 0 {
        return Err(invalid());
    }

    let mut dir = crumbler_dir(root);
    let mut parent: Option<EntityKind> = None;
    for pair in parts.chunks(2) {
        let (kind, _) = EntityKind::parse_dir_name(pair[1]).ok_or_else(invalid)?;
        let placed = match parent {
            None => kind == EntityKind::Phase,
            Some(p) => p.can_contain(kind),
        };
        if !placed || pair[0] != kind.container() {
            return Err(invalid());
        }
        dir = dir.join(pair[0]).join(pair[1]);
        parent = Some(kind);
    }
    let kind = parent.ok_or_else(invalid)?;
    Ok((kind, dir))
}

/// Entity subdirectories of `kind` under `entity`, sorted by index.
///
/// Directories that do not match `NNNN-<kind>` are ignored. A missing
/// container yields an empty list.
pub fn list_children(entity: &Path, kind: EntityKind) -> Result<Vec<PathBuf>> {
    list_entities(&children_dir(entity, kind), kind)
}

/// Phase directories under `root`, sorted by index.
pub fn list_phases(root: &Path) -> Result<Vec<PathBuf>> {
    list_entities(&phases_dir(root), EntityKind::Phase)
}

fn list_entities(container: &Path, kind: EntityKind) -> Result<Vec<PathBuf>> {
    if !container.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(container)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some((k, index)) = EntityKind::parse_dir_name(name) {
            if k == kind {
                found.push((index, entry.path()));
            }
        }
    }
    found.sort_by_key(|(index, _)| *index);
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Next free index in `container` for `kind` (max + 1, from 1).
///
/// Fails once `MAX_INDEX` is taken: a five-digit name would not be an entity.
pub fn next_index(container: &Path, kind: EntityKind) -> Result<u32> {
    let last = list_entities(container, kind)?
        .iter()
        .filter_map(|p| EntityKind::parse_dir_name(p.file_name()?.to_str()?))
        .map(|(_, i)| i)
        .max()
        .unwrap_or(0);
    if last >= MAX_INDEX {
        return Err(CrumblerError::IndexExhausted {
            kind: kind.to_string(),
            container: container.to_path_buf(),
            max: MAX_INDEX,
        });
    }
    Ok(last + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.crumbler/config.yaml")
        );
        assert_eq!(
            child_dir(&phase_dir(root, 1), EntityKind::Sprint, 2),
            PathBuf::from("/tmp/proj/.crumbler/phases/0001-phase/sprints/0002-sprint")
        );
    }

    #[test]
    fn relative_is_anchored_at_hierarchy_dir() {
        let root = Path::new("/tmp/proj");
        let sprint = child_dir(&phase_dir(root, 1), EntityKind::Sprint, 1);
        assert_eq!(relative(root, &sprint), "phases/0001-phase/sprints/0001-sprint");
        assert_eq!(relative(root, Path::new("/tmp/proj/README.md")), "README.md");
        assert_eq!(relative(root, Path::new("/elsewhere/x")), "/elsewhere/x");
    }

    #[test]
    fn resolve_entity_ref_accepts_valid_chains() {
        let root = Path::new("/tmp/proj");
        let (kind, dir) =
            resolve_entity_ref(root, "phases/0001-phase/sprints/0002-sprint/tickets/0003-ticket")
                .unwrap();
        assert_eq!(kind, EntityKind::Ticket);
        assert!(dir.ends_with("tickets/0003-ticket"));

        let (kind, _) = resolve_entity_ref(root, ".crumbler/phases/0001-phase/goals/0001-goal/")
            .unwrap();
        assert_eq!(kind, EntityKind::Goal);
    }

    #[test]
    fn resolve_entity_ref_rejects_bad_chains() {
        let root = Path::new("/tmp/proj");
        for bad in [
            "",
            "phases",
            "sprints/0001-sprint",
            "phases/0001-phase/tickets/0001-ticket",
            "phases/0001-phase/goals/0001-goal/goals/0002-goal",
            "phases/0001-sprint",
            "phases/../0001-phase",
        ] {
            assert!(resolve_entity_ref(root, bad).is_err(), "expected invalid: {bad}");
        }
    }

    #[test]
    fn list_children_sorts_and_filters() {
        let dir = TempDir::new().unwrap();
        let phase = dir.path().join("0001-phase");
        for name in ["0010-sprint", "0002-sprint", "notes", "0003-goal", "02-sprint"] {
            std::fs::create_dir_all(phase.join("sprints").join(name)).unwrap();
        }
        std::fs::write(phase.join("sprints/0004-sprint"), b"").unwrap();

        let sprints = list_children(&phase, EntityKind::Sprint).unwrap();
        let names: Vec<_> = sprints
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["0002-sprint", "0010-sprint"]);
        assert_eq!(
            next_index(&children_dir(&phase, EntityKind::Sprint), EntityKind::Sprint).unwrap(),
            11
        );
    }

    #[test]
    fn next_index_stops_at_four_digits() {
        let dir = TempDir::new().unwrap();
        let container = dir.path().join("phases");
        std::fs::create_dir_all(container.join("9998-phase")).unwrap();
        assert_eq!(next_index(&container, EntityKind::Phase).unwrap(), 9999);

        std::fs::create_dir_all(container.join("9999-phase")).unwrap();
        assert!(matches!(
            next_index(&container, EntityKind::Phase),
            Err(CrumblerError::IndexExhausted { max: 9999, .. })
        ));
    }

    #[test]
    fn missing_container_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_children(dir.path(), EntityKind::Goal).unwrap().is_empty());
        assert_eq!(
            next_index(&dir.path().join("goals"), EntityKind::Goal).unwrap(),
            1
        );
    }
}
