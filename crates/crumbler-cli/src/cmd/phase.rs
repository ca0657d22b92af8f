use anyhow::Context;
use clap::Subcommand;
use crumbler_core::{scaffold, EntityKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// Create the next phase
    Create,
    /// Close a phase once all of its sprints and goals are closed
    Close {
        /// Phase path, e.g. phases/0001-phase
        phase: String,
    },
}

pub fn run(root: &Path, subcmd: PhaseSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PhaseSubcommand::Create => {
            let dir = scaffold::create_phase(root).context("failed to create phase")?;
            super::print_created(root, EntityKind::Phase, &dir, json)
        }
        PhaseSubcommand::Close { phase } => super::complete(root, EntityKind::Phase, &phase, json),
    }
}
