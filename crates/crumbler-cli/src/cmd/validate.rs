use crate::output::{format_validation, print_json};
use anyhow::Context;
use crumbler_core::{collector, config::Config, hierarchy};
use std::path::Path;

/// Fail-fast check: report the first problem in traversal order.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let result = hierarchy::validate_hierarchy_with(root, &config.validation_options());

    match result {
        Ok(()) => {
            if json {
                print_json(&serde_json::json!({ "valid": true }))?;
            } else {
                println!("Hierarchy is valid.");
            }
            Ok(())
        }
        Err(e) => {
            if json {
                if let Some(v) = e.as_validation() {
                    print_json(&serde_json::json!({ "valid": false, "error": v }))?;
                }
            }
            Err::<(), _>(e).context("validation failed")
        }
    }
}

/// Full diagnostics: every problem in the tree.
pub fn doctor(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let errors = collector::collect_all_errors_with(root, &config.validation_options())
        .context("failed to walk hierarchy")?;
    let report = collector::Report::new(errors);

    if json {
        print_json(&report)?;
    } else if report.is_clean() {
        println!("No problems found.");
    } else {
        for err in &report.errors {
            println!("{}", format_validation(err));
        }
        println!();
        let summary: Vec<String> = report
            .counts
            .iter()
            .map(|(kind, n)| format!("{kind}: {n}"))
            .collect();
        println!("{} problem(s) ({})", report.errors.len(), summary.join(", "));
    }

    if !report.is_clean() {
        anyhow::bail!("doctor found {} problem(s)", report.errors.len());
    }
    Ok(())
}
