use super::ui;
use crate::core::models::ExportBundle;
use crate::store::FinanceStore;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Writes a backup bundle to `out`, or to stdout when no file is given.
pub fn export(store: &FinanceStore, out: Option<&Path>) -> Result<()> {
    let bundle = store.export();
    let json = serde_json::to_string_pretty(&bundle).context("Failed to serialize backup")?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;
            info!("Exported backup to {}", path.display());
            println!(
                "Exported {} investments, {} incomes, {} expenses to {}",
                bundle.investments.len(),
                bundle.incomes.len(),
                bundle.expenses.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn read_bundle(path: &Path) -> Result<ExportBundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse backup file: {}", path.display()))
}

pub fn import(store: &FinanceStore, file: &Path) -> Result<()> {
    let bundle = read_bundle(file)?;
    let replaced = store.import(bundle)?;
    if replaced.is_empty() {
        println!(
            "{}",
            ui::style_text("Nothing to import, backup is empty", ui::StyleType::Subtle)
        );
    } else {
        println!("Imported {}", replaced.join(", "));
    }
    Ok(())
}
