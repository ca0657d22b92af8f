use crumbler_core::{CrumblerError, ValidationError};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Find the structured validation error anywhere in an error chain.
pub fn validation_error(err: &anyhow::Error) -> Option<&ValidationError> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<CrumblerError>()
            .and_then(CrumblerError::as_validation)
            .or_else(|| cause.downcast_ref::<ValidationError>())
    })
}

/// Render a validation error as indented text: message, paths, fix.
pub fn format_validation(err: &ValidationError) -> String {
    let mut out = format!("[{}] {}", err.kind, err.message);
    for path in &err.paths {
        out.push_str(&format!("\n  - {path}"));
    }
    if !err.fix.is_empty() {
        out.push_str(&format!("\n  fix: {}", err.fix));
    }
    out
}
