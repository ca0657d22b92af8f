use crate::error::CrumblerError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status of an entity, derived from which marker file is present.
///
/// `Unknown` means no marker was found. It is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    Closed,
    Done,
    Unknown,
}

impl Status {
    /// Every status that has a marker file, in the order markers are checked.
    pub fn markers() -> &'static [Status] {
        &[Status::Open, Status::Closed, Status::Done]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Closed => "closed",
            Status::Done => "done",
            Status::Unknown => "unknown",
        }
    }

    /// Marker filename for this status. `None` for `Unknown`.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Status::Open => Some(crate::paths::OPEN_MARKER),
            Status::Closed => Some(crate::paths::CLOSED_MARKER),
            Status::Done => Some(crate::paths::DONE_MARKER),
            Status::Unknown => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = CrumblerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "closed" => Ok(Status::Closed),
            "done" => Ok(Status::Done),
            "unknown" => Ok(Status::Unknown),
            _ => Err(CrumblerError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Phase,
    Sprint,
    Ticket,
    Goal,
}

static ENTITY_DIR_RE: OnceLock<Regex> = OnceLock::new();

fn entity_dir_re() -> &'static Regex {
    ENTITY_DIR_RE.get_or_init(|| {
        Regex::new(r"^(\d{4})-(phase|sprint|ticket|goal)$").expect("entity dir pattern is valid")
    })
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Phase,
            EntityKind::Sprint,
            EntityKind::Ticket,
            EntityKind::Goal,
        ]
    }

    pub fn as_str(self) -> &'static str {
        self.suffix()
    }

    /// Directory-name suffix, e.g. `0003-ticket`.
    pub fn suffix(self) -> &'static str {
        match self {
            EntityKind::Phase => "phase",
            EntityKind::Sprint => "sprint",
            EntityKind::Ticket => "ticket",
            EntityKind::Goal => "goal",
        }
    }

    /// Name of the container directory holding entities of this kind.
    pub fn container(self) -> &'static str {
        match self {
            EntityKind::Phase => "phases",
            EntityKind::Sprint => "sprints",
            EntityKind::Ticket => "tickets",
            EntityKind::Goal => "goals",
        }
    }

    /// Child kinds in traversal order. Goals come first at every level.
    pub fn child_kinds(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Phase => &[EntityKind::Goal, EntityKind::Sprint],
            EntityKind::Sprint => &[EntityKind::Goal, EntityKind::Ticket],
            EntityKind::Ticket => &[EntityKind::Goal],
            EntityKind::Goal => &[],
        }
    }

    pub fn can_contain(self, child: EntityKind) -> bool {
        self.child_kinds().contains(&child)
    }

    /// The terminal status for this kind: `done` for tickets, `closed` otherwise.
    pub fn completed_status(self) -> Status {
        match self {
            EntityKind::Ticket => Status::Done,
            _ => Status::Closed,
        }
    }

    /// Whether `status` belongs to this kind's marker set.
    pub fn allows(self, status: Status) -> bool {
        status == Status::Open || status == self.completed_status()
    }

    pub fn dir_name(self, index: u32) -> String {
        format!("{index:04}-{}", self.suffix())
    }

    /// Parse `NNNN-<kind>`. Anything else is not an entity directory.
    pub fn parse_dir_name(name: &str) -> Option<(EntityKind, u32)> {
        let caps = entity_dir_re().captures(name)?;
        let index = caps[1].parse().ok()?;
        let kind = match &caps[2] {
            "phase" => EntityKind::Phase,
            "sprint" => EntityKind::Sprint,
            "ticket" => EntityKind::Ticket,
            _ => EntityKind::Goal,
        };
        Some((kind, index))
    }

    /// Kind of the entity rooted at `dir`, judged from its final path component.
    pub fn of_dir(dir: &Path) -> Option<EntityKind> {
        let name = dir.file_name()?.to_str()?;
        Self::parse_dir_name(name).map(|(kind, _)| kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_names_are_zero_padded() {
        assert_eq!(EntityKind::Phase.dir_name(1), "0001-phase");
        assert_eq!(EntityKind::Ticket.dir_name(42), "0042-ticket");
    }

    #[test]
    fn parse_dir_name_accepts_entities_only() {
        assert_eq!(
            EntityKind::parse_dir_name("0003-ticket"),
            Some((EntityKind::Ticket, 3))
        );
        for name in ["003-ticket", "0003-tickets", "notes", "0003-epic", "x0003-goal"] {
            assert!(EntityKind::parse_dir_name(name).is_none(), "{name}");
        }
    }

    #[test]
    fn marker_sets_per_kind() {
        assert!(EntityKind::Ticket.allows(Status::Done));
        assert!(!EntityKind::Ticket.allows(Status::Closed));
        assert!(EntityKind::Goal.allows(Status::Closed));
        assert!(!EntityKind::Phase.allows(Status::Done));
        assert!(!EntityKind::Sprint.allows(Status::Unknown));
    }

    #[test]
    fn goals_are_leaves() {
        assert!(EntityKind::Goal.child_kinds().is_empty());
        assert!(EntityKind::Sprint.can_contain(EntityKind::Ticket));
        assert!(!EntityKind::Phase.can_contain(EntityKind::Ticket));
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in Status::markers() {
            assert_eq!(s.as_str().parse::<Status>().unwrap(), *s);
        }
    }
}
