mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, goal::GoalSubcommand, phase::PhaseSubcommand,
    sprint::SprintSubcommand, ticket::TicketSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crumbler",
    about = "Track phases, sprints, tickets and goals with marker-file status",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .crumbler/)
    #[arg(long, global = true, env = "CRUMBLER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize crumbler in the current project
    Init,

    /// Manage phases
    Phase {
        #[command(subcommand)]
        subcommand: PhaseSubcommand,
    },

    /// Manage sprints
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },

    /// Manage tickets
    Ticket {
        #[command(subcommand)]
        subcommand: TicketSubcommand,
    },

    /// Manage goals on phases, sprints and tickets
    Goal {
        #[command(subcommand)]
        subcommand: GoalSubcommand,
    },

    /// Show the whole hierarchy with statuses
    Status,

    /// Show the current open phase, sprint and ticket
    Current,

    /// Check the hierarchy and stop at the first problem
    Validate,

    /// Report every problem in the hierarchy
    Doctor,

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Phase { subcommand } => cmd::phase::run(&root, subcommand, cli.json),
        Commands::Sprint { subcommand } => cmd::sprint::run(&root, subcommand, cli.json),
        Commands::Ticket { subcommand } => cmd::ticket::run(&root, subcommand, cli.json),
        Commands::Goal { subcommand } => cmd::goal::run(&root, subcommand, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Current => cmd::status::current(&root, cli.json),
        Commands::Validate => cmd::validate::run(&root, cli.json),
        Commands::Doctor => cmd::validate::doctor(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        if let Some(v) = output::validation_error(&e) {
            for path in &v.paths {
                eprintln!("  - {path}");
            }
            if !v.fix.is_empty() {
                eprintln!("fix: {}", v.fix);
            }
        }
        std::process::exit(1);
    }
}
