//! On-disk tree builder for tests. Writes markers directly, bypassing the
//! transition validator, so corrupt layouts can be produced on purpose.

use crate::paths;
use crate::types::{EntityKind, Status};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) struct Tree {
    dir: TempDir,
}

impl Tree {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(paths::phases_dir(dir.path())).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn phase(&self, index: u32, status: Status) -> PathBuf {
        let dir = paths::phase_dir(self.root(), index);
        make_entity(&dir, status);
        dir
    }

    /// Add a child entity. Goals get a name payload.
    pub fn child(&self, parent: &Path, kind: EntityKind, index: u32, status: Status) -> PathBuf {
        let dir = paths::child_dir(parent, kind, index);
        make_entity(&dir, status);
        if kind == EntityKind::Goal {
            std::fs::write(paths::goal_name_path(&dir), format!("goal {index}")).unwrap();
        }
        dir
    }

    pub fn unnamed_goal(&self, parent: &Path, index: u32, status: Status) -> PathBuf {
        let dir = paths::child_dir(parent, EntityKind::Goal, index);
        make_entity(&dir, status);
        dir
    }

    /// Add an extra marker, e.g. to create a conflict.
    pub fn add_marker(&self, dir: &Path, status: Status) {
        if let Some(path) = paths::marker_path(dir, status) {
            std::fs::write(path, b"").unwrap();
        }
    }
}

fn make_entity(dir: &Path, status: Status) {
    std::fs::create_dir_all(dir).unwrap();
    if let Some(path) = paths::marker_path(dir, status) {
        std::fs::write(path, b"").unwrap();
    }
}

/// Snapshot of every file under `root`, for asserting read-only behaviour.
pub(crate) fn snapshot(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, out);
            }
            out.push(path);
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}
