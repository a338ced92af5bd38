use super::ui;
use crate::core::models::Investment;
use crate::core::nav::NavProvider;
use crate::store::{FinanceStore, NavRefreshReport};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;

impl NavRefreshReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Investment"),
            ui::header_cell("Current Value"),
            ui::header_cell("Status"),
        ]);

        for outcome in &self.outcomes {
            let (value, status) = match &outcome.result {
                Ok(current) => (ui::amount_cell(*current), Cell::new("updated")),
                Err(e) => (
                    ui::format_optional_cell(None::<f64>, |v| format!("{v:.2}")),
                    Cell::new(ui::style_text(&e.reason, ui::StyleType::Error)),
                ),
            };
            table.add_row(vec![Cell::new(&outcome.name), value, status]);
        }

        let mut output = table.to_string();
        output.push_str(&format!(
            "\n\nUpdated {} of {} investments",
            ui::style_text(&self.summary.updated.to_string(), ui::StyleType::TotalValue),
            self.summary.total
        ));
        output
    }
}

pub async fn refresh(store: &FinanceStore, provider: &(dyn NavProvider + Send + Sync)) -> Result<()> {
    let pb = ui::new_spinner("Fetching NAVs...");
    let report = store.refresh_navs(provider).await;
    pb.finish_and_clear();

    if report.outcomes.is_empty() {
        println!("No investments with a scheme code to refresh.");
        return Ok(());
    }
    println!("{}", report.display_as_table());
    ui::print_persist_warning(&report.warning);
    Ok(())
}

/// Applies a JSON array of already revalued investments.
pub fn apply(store: &FinanceStore, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read NAV updates: {}", file.display()))?;
    let updates: Vec<Investment> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse NAV updates: {}", file.display()))?;

    let committed = store.apply_nav_updates(updates);
    println!(
        "Updated {} of {} investments",
        committed.value.updated, committed.value.total
    );
    ui::print_persist_warning(&committed.warning);
    Ok(())
}
