use super::ui;
use crate::core::analytics::{self, DashboardSummary};
use crate::store::FinanceStore;
use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use comfy_table::Cell;
use std::collections::BTreeMap;

fn breakdown_table(title: &str, totals: &BTreeMap<String, f64>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell(title), ui::header_cell("Amount")]);
    for (key, amount) in totals {
        table.add_row(vec![Cell::new(key), ui::amount_cell(*amount)]);
    }
    table.to_string()
}

impl DashboardSummary {
    pub fn display_as_text(&self, currency: &str) -> String {
        let mut totals = ui::new_styled_table();
        totals.set_header(vec![
            ui::header_cell(""),
            ui::header_cell(&format!("Amount ({currency})")),
        ]);
        totals.add_row(vec![Cell::new("Income"), ui::amount_cell(self.total_income)]);
        totals.add_row(vec![
            Cell::new("Expenses"),
            ui::amount_cell(self.total_expenses),
        ]);
        totals.add_row(vec![
            Cell::new("Invested"),
            ui::amount_cell(self.total_invested),
        ]);
        totals.add_row(vec![
            Cell::new("Current value"),
            ui::amount_cell(self.total_current),
        ]);
        totals.add_row(vec![
            Cell::new("Gain"),
            ui::gain_cell(
                self.total_gain,
                format!("{:.2} ({:.2}%)", self.total_gain, self.gain_percent),
            ),
        ]);

        let mut by_type = ui::new_styled_table();
        by_type.set_header(vec![
            ui::header_cell("Type"),
            ui::header_cell("Invested"),
            ui::header_cell("Current"),
            ui::header_cell("Gain"),
        ]);
        for (kind, t) in &self.investments_by_type {
            by_type.add_row(vec![
                Cell::new(kind),
                ui::amount_cell(t.invested),
                ui::amount_cell(t.current),
                ui::gain_cell(t.gain(), format!("{:.2}", t.gain())),
            ]);
        }

        let mut trend = ui::new_styled_table();
        trend.set_header(vec![ui::header_cell("Month"), ui::header_cell("Expenses")]);
        for m in &self.expense_trend {
            trend.add_row(vec![Cell::new(&m.label), ui::amount_cell(m.total)]);
        }

        let net_style = if self.net_total >= 0.0 {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };

        let mut output = format!(
            "Dashboard: {}\n\n",
            ui::style_text(&self.month, ui::StyleType::Title)
        );
        output.push_str(&totals.to_string());
        output.push_str(&format!(
            "\n\nThis month: income {:.2}, expenses {:.2}, savings {:.2}\n\n",
            self.month_income,
            self.month_expenses,
            self.month_savings()
        ));
        output.push_str(&breakdown_table("Expense category", &self.expenses_by_category));
        output.push_str("\n\n");
        output.push_str(&breakdown_table("Member", &self.expenses_by_member));
        output.push_str("\n\n");
        output.push_str(&breakdown_table("Income category", &self.income_by_category));
        output.push_str("\n\n");
        output.push_str(&by_type.to_string());
        output.push_str("\n\n");
        output.push_str(&trend.to_string());
        output.push_str(&format!(
            "\n\nNet Total ({}): {}",
            ui::style_text(currency, ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.net_total), net_style)
        ));
        output
    }
}

/// Checks a `YYYY-MM` month argument.
pub fn parse_month(month: &str) -> Result<String> {
    if month.len() != 7 || NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_err() {
        bail!("Invalid month '{month}', expected YYYY-MM");
    }
    Ok(month.to_string())
}

pub fn run(
    store: &FinanceStore,
    month: Option<&str>,
    trend_months: usize,
    currency: &str,
) -> Result<()> {
    let month = match month {
        Some(m) => parse_month(m)?,
        None => analytics::current_month(),
    };
    let summary = DashboardSummary::compute(
        &store.investments().list(),
        &store.incomes().list(),
        &store.expenses().list(),
        &month,
        trend_months,
        Local::now().date_naive(),
    );
    println!("{}", summary.display_as_text(currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Expense, Income};

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-01").unwrap(), "2025-01");
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025-1").is_err());
        assert!(parse_month("January").is_err());
    }

    #[test]
    fn test_display_contains_sections() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let incomes = vec![Income {
            source: "Salary".to_string(),
            amount: 50000.0,
            category: "Salary".to_string(),
            date: "2025-01-01".to_string(),
            added_by: "Asha".to_string(),
            ..Default::default()
        }];
        let expenses = vec![Expense {
            description: "Rent".to_string(),
            amount: 15000.0,
            category: "Housing".to_string(),
            date: "2025-01-05".to_string(),
            added_by: "Ravi".to_string(),
            ..Default::default()
        }];
        let summary = DashboardSummary::compute(&[], &incomes, &expenses, "2025-01", 3, today);
        let text = summary.display_as_text("INR");

        assert!(text.contains("2025-01"));
        assert!(text.contains("Housing"));
        assert!(text.contains("Ravi"));
        assert!(text.contains("Jan 2025"));
        assert!(text.contains("35000.00"));
    }
}
