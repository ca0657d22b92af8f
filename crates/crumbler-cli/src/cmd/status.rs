use crate::output::{print_json, print_table};
use anyhow::Context;
use crumbler_core::tree::{self, EntityNode};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let nodes = tree::load_tree(root).context("failed to read hierarchy")?;

    if json {
        return print_json(&nodes);
    }
    if nodes.is_empty() {
        println!("No phases.");
        return Ok(());
    }

    let mut rows = Vec::new();
    for node in &nodes {
        push_rows(node, 0, &mut rows);
    }
    print_table(&["ENTITY", "STATUS", "NAME"], rows);
    Ok(())
}

fn push_rows(node: &EntityNode, depth: usize, rows: &mut Vec<Vec<String>>) {
    let label = node
        .path
        .rsplit('/')
        .next()
        .unwrap_or(node.path.as_str());
    let status = if node.conflict {
        "CONFLICT".to_string()
    } else {
        node.status.to_string()
    };
    rows.push(vec![
        format!("{}{label}", "  ".repeat(depth)),
        status,
        node.name.clone().unwrap_or_default(),
    ]);
    for child in &node.children {
        push_rows(child, depth + 1, rows);
    }
}

pub fn current(root: &Path, json: bool) -> anyhow::Result<()> {
    let current = tree::current(root).context("failed to read hierarchy")?;

    if json {
        return print_json(&current);
    }
    let Some(current) = current else {
        println!("No open phase.");
        return Ok(());
    };
    println!("Phase:  {}", current.phase);
    println!("Sprint: {}", current.sprint.as_deref().unwrap_or("(none open)"));
    println!("Ticket: {}", current.ticket.as_deref().unwrap_or("(none open)"));
    Ok(())
}
