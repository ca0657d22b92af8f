use crate::output::print_json;
use anyhow::Context;
use crumbler_core::{paths, scaffold};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let fresh = scaffold::init(root).context("failed to initialize project")?;
    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "created": fresh,
        }))?;
    } else if fresh {
        println!("Initialized crumbler in {}", paths::crumbler_dir(root).display());
    } else {
        println!("Already initialized: {}", paths::crumbler_dir(root).display());
    }
    Ok(())
}
