use anyhow::Context;
use clap::Subcommand;
use crumbler_core::{paths, scaffold, EntityKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Add a goal to a phase, sprint or ticket
    Create {
        /// Parent entity path
        parent: String,
        /// What the goal is
        #[arg(long)]
        name: String,
    },
    /// Close a goal
    Close {
        /// Goal path, e.g. phases/0001-phase/goals/0001-goal
        goal: String,
    },
}

pub fn run(root: &Path, subcmd: GoalSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        GoalSubcommand::Create { parent, name } => {
            let (kind, _) = paths::resolve_entity_ref(root, &parent)?;
            if !kind.can_contain(EntityKind::Goal) {
                anyhow::bail!("a {kind} cannot hold goals");
            }
            let parent_dir = super::resolve(root, &parent, kind)?;
            let goal = scaffold::create_goal(root, &parent_dir, &name)
                .with_context(|| format!("failed to create goal in '{parent}'"))?;
            super::print_created(root, EntityKind::Goal, &goal, json)
        }
        GoalSubcommand::Close { goal } => super::complete(root, EntityKind::Goal, &goal, json),
    }
}
