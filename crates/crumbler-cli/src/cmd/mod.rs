pub mod config;
pub mod goal;
pub mod init;
pub mod phase;
pub mod sprint;
pub mod status;
pub mod ticket;
pub mod validate;

use crate::output::print_json;
use anyhow::Context;
use crumbler_core::{
    config::Config,
    hierarchy::{self, Verdict},
    paths, transition, EntityKind,
};
use std::path::{Path, PathBuf};

/// Resolve `reference` and check it names an entity of `kind` that exists.
pub(crate) fn resolve(root: &Path, reference: &str, kind: EntityKind) -> anyhow::Result<PathBuf> {
    let (found, dir) = paths::resolve_entity_ref(root, reference)?;
    if found != kind {
        anyhow::bail!("'{reference}' is a {found}, not a {kind}");
    }
    if !dir.is_dir() {
        anyhow::bail!("{kind} '{reference}' not found");
    }
    Ok(dir)
}

/// Gate, then apply, the terminal transition for `kind`.
///
/// With `validate_before_transition` on, the whole tree must be consistent
/// before anything changes.
pub(crate) fn complete(
    root: &Path,
    kind: EntityKind,
    reference: &str,
    json: bool,
) -> anyhow::Result<()> {
    let dir = resolve(root, reference, kind)?;
    let config = Config::load(root).context("failed to load config")?;
    if config.validate_before_transition {
        hierarchy::validate_hierarchy_with(root, &config.validation_options())
            .context("hierarchy is inconsistent; run 'crumbler doctor' for the full list")?;
    }

    let verdict: Verdict = match kind {
        EntityKind::Phase => hierarchy::can_close_phase(root, &dir)?,
        EntityKind::Sprint => hierarchy::can_close_sprint(root, &dir)?,
        EntityKind::Ticket => hierarchy::can_mark_ticket_done(root, &dir)?,
        EntityKind::Goal => hierarchy::can_close_goal(root, &dir)?,
    };
    verdict
        .into_result()
        .with_context(|| format!("cannot complete {kind} '{reference}'"))?;

    let target = kind.completed_status();
    match kind {
        EntityKind::Ticket => transition::set_done_validated(root, &dir)?,
        _ => transition::set_closed_validated(root, &dir)?,
    }

    let rel = paths::relative(root, &dir);
    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "path": rel,
            "status": target,
        }))?;
    } else {
        println!("Marked {kind} {rel} {target}.");
    }
    Ok(())
}

pub(crate) fn print_created(
    root: &Path,
    kind: EntityKind,
    dir: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let rel = paths::relative(root, dir);
    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "path": rel,
            "status": crumbler_core::Status::Open,
        }))?;
    } else {
        println!("Created {kind} {rel}.");
    }
    Ok(())
}
