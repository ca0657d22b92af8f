use anyhow::Context;
use clap::Subcommand;
use crumbler_core::{scaffold, EntityKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// Create the next sprint in a phase
    Create {
        /// Parent phase path, e.g. phases/0001-phase
        phase: String,
    },
    /// Close a sprint once all of its tickets are done and goals closed
    Close {
        /// Sprint path, e.g. phases/0001-phase/sprints/0001-sprint
        sprint: String,
    },
}

pub fn run(root: &Path, subcmd: SprintSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SprintSubcommand::Create { phase } => {
            let parent = super::resolve(root, &phase, EntityKind::Phase)?;
            let dir = scaffold::create_sprint(root, &parent)
                .with_context(|| format!("failed to create sprint in '{phase}'"))?;
            super::print_created(root, EntityKind::Sprint, &dir, json)
        }
        SprintSubcommand::Close { sprint } => {
            super::complete(root, EntityKind::Sprint, &sprint, json)
        }
    }
}
