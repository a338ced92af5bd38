use super::ui;
use crate::core::models::Settings;
use crate::store::FinanceStore;
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use std::path::Path;

impl Settings {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("List"), ui::header_cell("Values")]);
        let lists = [
            ("Expense categories", &self.categories),
            ("Investment types", &self.investment_types),
            ("Income categories", &self.income_categories),
            ("Payment methods", &self.payment_methods),
            ("Members", &self.members),
        ];
        for (name, values) in lists {
            table.add_row(vec![Cell::new(name), Cell::new(values.join(", "))]);
        }
        table.to_string()
    }
}

pub fn show(store: &FinanceStore) -> Result<()> {
    println!("{}", store.settings().get().display_as_table());
    Ok(())
}

/// Replaces the settings with the contents of a JSON file.
pub fn set(store: &FinanceStore, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read settings file: {}", file.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse settings file: {}", file.display()))?;
    if !settings.is_present() {
        bail!("Settings must list at least one expense category");
    }

    let committed = store.settings().set(settings);
    println!("{}", committed.value.display_as_table());
    ui::print_persist_warning(&committed.warning);
    Ok(())
}
