//! list/add/update/delete for the three record collections.

use super::ui;
use crate::core::models::{Expense, Income, Investment, Record};
use crate::store::collection::RecordStore;
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Subcommand};
use comfy_table::Cell;

/// Rendering of a record type as a table row.
pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<Cell>;
}

/// Flags describing a record. Missing flags are left for validation to
/// reject on add, and keep the stored value on update.
pub trait RecordFields<T> {
    fn build(self) -> T;
    fn apply(self, existing: T) -> T;
}

pub enum RecordAction<F> {
    List,
    Add(F),
    Update(String, F),
    Delete(String),
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[derive(Args, Debug, Clone, Default)]
pub struct InvestmentFields {
    /// Name, e.g. "HDFC Flexi Cap"
    #[arg(long)]
    pub name: Option<String>,
    /// Type, e.g. "Mutual Fund", "FD", "Gold"
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Amount invested
    #[arg(long)]
    pub invested: Option<f64>,
    /// Current value (defaults to the invested amount on add)
    #[arg(long)]
    pub current: Option<f64>,
    /// Purchase date, YYYY-MM-DD (defaults to today on add)
    #[arg(long)]
    pub date: Option<String>,
    /// Scheme code used for NAV refresh
    #[arg(long)]
    pub scheme_code: Option<String>,
    /// Units held
    #[arg(long)]
    pub units: Option<f64>,
}

impl RecordFields<Investment> for InvestmentFields {
    fn build(self) -> Investment {
        let invested = self.invested.unwrap_or_default();
        Investment {
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            invested,
            current: self.current.unwrap_or(invested),
            date: self.date.unwrap_or_else(today),
            scheme_code: self.scheme_code,
            units: self.units,
            ..Default::default()
        }
    }

    fn apply(self, existing: Investment) -> Investment {
        Investment {
            name: self.name.unwrap_or(existing.name),
            kind: self.kind.unwrap_or(existing.kind),
            invested: self.invested.unwrap_or(existing.invested),
            current: self.current.unwrap_or(existing.current),
            date: self.date.unwrap_or(existing.date),
            scheme_code: self.scheme_code.or(existing.scheme_code),
            units: self.units.or(existing.units),
            ..existing
        }
    }
}

/// Flags shared by incomes and expenses.
#[derive(Args, Debug, Clone, Default)]
pub struct TransactionFields {
    /// Description (expenses) or source (incomes)
    #[arg(long, aliases = ["source", "desc"])]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long)]
    pub category: Option<String>,
    /// Date, YYYY-MM-DD (defaults to today on add)
    #[arg(long)]
    pub date: Option<String>,
    /// Member who added the entry
    #[arg(long)]
    pub added_by: Option<String>,
    /// e.g. Cash, UPI, Card
    #[arg(long)]
    pub payment_method: Option<String>,
}

impl RecordFields<Income> for TransactionFields {
    fn build(self) -> Income {
        Income {
            source: self.description.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            date: self.date.unwrap_or_else(today),
            added_by: self.added_by.unwrap_or_default(),
            payment_method: self.payment_method.unwrap_or_default(),
            ..Default::default()
        }
    }

    fn apply(self, existing: Income) -> Income {
        Income {
            source: self.description.unwrap_or(existing.source),
            amount: self.amount.unwrap_or(existing.amount),
            category: self.category.unwrap_or(existing.category),
            date: self.date.unwrap_or(existing.date),
            added_by: self.added_by.unwrap_or(existing.added_by),
            payment_method: self.payment_method.unwrap_or(existing.payment_method),
            ..existing
        }
    }
}

impl RecordFields<Expense> for TransactionFields {
    fn build(self) -> Expense {
        Expense {
            description: self.description.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            date: self.date.unwrap_or_else(today),
            added_by: self.added_by.unwrap_or_default(),
            payment_method: self.payment_method.unwrap_or_default(),
            ..Default::default()
        }
    }

    fn apply(self, existing: Expense) -> Expense {
        Expense {
            description: self.description.unwrap_or(existing.description),
            amount: self.amount.unwrap_or(existing.amount),
            category: self.category.unwrap_or(existing.category),
            date: self.date.unwrap_or(existing.date),
            added_by: self.added_by.unwrap_or(existing.added_by),
            payment_method: self.payment_method.unwrap_or(existing.payment_method),
            ..existing
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InvestmentCommand {
    /// List investments
    List,
    /// Add an investment
    Add(InvestmentFields),
    /// Change fields of an investment
    Update {
        id: String,
        #[command(flatten)]
        fields: InvestmentFields,
    },
    /// Delete an investment
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionCommand {
    /// List entries
    List,
    /// Add an entry
    Add(TransactionFields),
    /// Change fields of an entry
    Update {
        id: String,
        #[command(flatten)]
        fields: TransactionFields,
    },
    /// Delete an entry
    Delete { id: String },
}

impl From<InvestmentCommand> for RecordAction<InvestmentFields> {
    fn from(cmd: InvestmentCommand) -> Self {
        match cmd {
            InvestmentCommand::List => RecordAction::List,
            InvestmentCommand::Add(fields) => RecordAction::Add(fields),
            InvestmentCommand::Update { id, fields } => RecordAction::Update(id, fields),
            InvestmentCommand::Delete { id } => RecordAction::Delete(id),
        }
    }
}

impl From<TransactionCommand> for RecordAction<TransactionFields> {
    fn from(cmd: TransactionCommand) -> Self {
        match cmd {
            TransactionCommand::List => RecordAction::List,
            TransactionCommand::Add(fields) => RecordAction::Add(fields),
            TransactionCommand::Update { id, fields } => RecordAction::Update(id, fields),
            TransactionCommand::Delete { id } => RecordAction::Delete(id),
        }
    }
}

impl Tabular for Investment {
    fn headers() -> Vec<&'static str> {
        vec!["Id", "Name", "Type", "Date", "Invested", "Current", "Gain", "Units"]
    }

    fn row(&self) -> Vec<Cell> {
        let gain = self.current - self.invested;
        vec![
            Cell::new(&self.id),
            Cell::new(&self.name),
            Cell::new(&self.kind),
            Cell::new(&self.date),
            ui::amount_cell(self.invested),
            ui::amount_cell(self.current),
            ui::gain_cell(gain, format!("{gain:.2}")),
            ui::format_optional_cell(self.held_units(), |u| format!("{u:.4}")),
        ]
    }
}

impl Tabular for Income {
    fn headers() -> Vec<&'static str> {
        vec!["Id", "Date", "Source", "Category", "Amount", "Added By", "Payment"]
    }

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.date),
            Cell::new(&self.source),
            Cell::new(&self.category),
            ui::amount_cell(self.amount),
            Cell::new(&self.added_by),
            Cell::new(&self.payment_method),
        ]
    }
}

impl Tabular for Expense {
    fn headers() -> Vec<&'static str> {
        vec!["Id", "Date", "Description", "Category", "Amount", "Added By", "Payment"]
    }

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.date),
            Cell::new(&self.description),
            Cell::new(&self.category),
            ui::amount_cell(self.amount),
            Cell::new(&self.added_by),
            Cell::new(&self.payment_method),
        ]
    }
}

pub fn render_table<T: Tabular>(records: &[T]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(T::headers().into_iter().map(ui::header_cell));
    for record in records {
        table.add_row(record.row());
    }
    table.to_string()
}

pub fn run<T, F>(store: &RecordStore<T>, action: RecordAction<F>) -> Result<()>
where
    T: Record + Tabular,
    F: RecordFields<T>,
{
    match action {
        RecordAction::List => {
            let records = store.list();
            if records.is_empty() {
                println!("No {} records yet.", T::KIND);
            } else {
                println!("{}", render_table(&records));
            }
        }
        RecordAction::Add(fields) => {
            let committed = store
                .add(fields.build())
                .with_context(|| format!("Failed to add {}", T::KIND))?;
            println!("Added {} {}", T::KIND, committed.value.id());
            ui::print_persist_warning(&committed.warning);
        }
        RecordAction::Update(id, fields) => {
            let existing = store.get(&id).with_context(|| format!("{} not found: {id}", T::KIND))?;
            let committed = store
                .update(&id, fields.apply(existing))
                .with_context(|| format!("Failed to update {} {id}", T::KIND))?;
            println!("{}", render_table(std::slice::from_ref(&committed.value)));
            ui::print_persist_warning(&committed.warning);
        }
        RecordAction::Delete(id) => {
            let committed = store
                .delete(&id)
                .with_context(|| format!("Failed to delete {} {id}", T::KIND))?;
            println!("Deleted {} {}", T::KIND, committed.value.id());
            ui::print_persist_warning(&committed.warning);
        }
    }
    Ok(())
}
