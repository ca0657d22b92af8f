use anyhow::Context;
use clap::Subcommand;
use crumbler_core::{scaffold, EntityKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum TicketSubcommand {
    /// Create the next ticket in a sprint
    Create {
        /// Parent sprint path, e.g. phases/0001-phase/sprints/0001-sprint
        sprint: String,
    },
    /// Mark a ticket done once all of its goals are closed
    Done {
        /// Ticket path
        ticket: String,
    },
}

pub fn run(root: &Path, subcmd: TicketSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TicketSubcommand::Create { sprint } => {
            let parent = super::resolve(root, &sprint, EntityKind::Sprint)?;
            let dir = scaffold::create_ticket(root, &parent)
                .with_context(|| format!("failed to create ticket in '{sprint}'"))?;
            super::print_created(root, EntityKind::Ticket, &dir, json)
        }
        TicketSubcommand::Done { ticket } => super::complete(root, EntityKind::Ticket, &ticket, json),
    }
}
