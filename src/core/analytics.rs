//! Provides the figures shown on the dashboard.
//!
//! Everything here is a pure function over record slices. Empty input yields
//! zeros and empty maps, never an error. Dates are compared as `YYYY-MM-DD`
//! strings so month filtering is a prefix match.
use crate::core::models::{Investment, Transaction};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket for records that leave the grouping field blank.
pub const UNKNOWN_BUCKET: &str = "Unknown";

pub fn total_invested(investments: &[Investment]) -> f64 {
    investments.iter().map(|inv| inv.invested).sum()
}

pub fn total_current(investments: &[Investment]) -> f64 {
    investments.iter().map(|inv| inv.current).sum()
}

pub fn total_gain(investments: &[Investment]) -> f64 {
    total_current(investments) - total_invested(investments)
}

/// Gain as a percentage of the invested principal, 0 when nothing is invested.
pub fn gain_percent(investments: &[Investment]) -> f64 {
    let invested = total_invested(investments);
    if invested > 0.0 {
        total_gain(investments) / invested * 100.0
    } else {
        0.0
    }
}

pub fn total_amount<T: Transaction>(records: &[T]) -> f64 {
    records.iter().map(Transaction::amount).sum()
}

/// `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn current_month() -> String {
    month_key(Local::now().date_naive())
}

/// Sum of amounts dated within `month` (`YYYY-MM`), defaulting to the current month.
pub fn monthly_total<T: Transaction>(records: &[T], month: Option<&str>) -> f64 {
    match month {
        Some(month) => sum_for_month(records, month),
        None => sum_for_month(records, &current_month()),
    }
}

fn sum_for_month<T: Transaction>(records: &[T], month: &str) -> f64 {
    records
        .iter()
        .filter(|r| r.date().starts_with(month))
        .map(Transaction::amount)
        .sum()
}

/// Totals per category. Records without a category are left out.
pub fn group_by_category<T: Transaction>(records: &[T]) -> BTreeMap<String, f64> {
    let mut groups = BTreeMap::new();
    for record in records {
        let category = record.category().trim();
        if category.is_empty() {
            continue;
        }
        *groups.entry(category.to_string()).or_insert(0.0) += record.amount();
    }
    groups
}

/// Totals per member, with anonymous records under [`UNKNOWN_BUCKET`].
pub fn group_by_member<T: Transaction>(records: &[T]) -> BTreeMap<String, f64> {
    let mut groups = BTreeMap::new();
    for record in records {
        let member = match record.added_by().trim() {
            "" => UNKNOWN_BUCKET,
            member => member,
        };
        *groups.entry(member.to_string()).or_insert(0.0) += record.amount();
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub invested: f64,
    pub current: f64,
}

impl TypeTotals {
    pub fn gain(&self) -> f64 {
        self.current - self.invested
    }
}

/// Invested and current sums per investment type. Untyped records land under
/// [`UNKNOWN_BUCKET`] so nothing is dropped from the totals.
pub fn group_investments_by_type(investments: &[Investment]) -> BTreeMap<String, TypeTotals> {
    let mut groups: BTreeMap<String, TypeTotals> = BTreeMap::new();
    for inv in investments {
        let kind = match inv.kind.trim() {
            "" => UNKNOWN_BUCKET,
            kind => kind,
        };
        let totals = groups.entry(kind.to_string()).or_default();
        totals.invested += inv.invested;
        totals.current += inv.current;
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// `YYYY-MM`
    pub month: String,
    /// Short display label, e.g. `Jan 2025`.
    pub label: String,
    pub total: f64,
}

/// Totals for the `months_back` calendar months ending with the current one.
pub fn monthly_trend<T: Transaction>(records: &[T], months_back: usize) -> Vec<MonthTotal> {
    monthly_trend_until(records, months_back, Local::now().date_naive())
}

/// Totals for the `months_back` calendar months ending with the month of
/// `today`, oldest first. Months without records are reported as zero.
pub fn monthly_trend_until<T: Transaction>(
    records: &[T],
    months_back: usize,
    today: NaiveDate,
) -> Vec<MonthTotal> {
    let anchor = today.year() as i64 * 12 + today.month0() as i64;
    (0..months_back as i64)
        .rev()
        .filter_map(|offset| {
            let index = anchor - offset;
            let year = i32::try_from(index.div_euclid(12)).ok()?;
            let month = index.rem_euclid(12) as u32 + 1;
            NaiveDate::from_ymd_opt(year, month, 1)
        })
        .map(|first| {
            let month = month_key(first);
            MonthTotal {
                total: sum_for_month(records, &month),
                label: first.format("%b %Y").to_string(),
                month,
            }
        })
        .collect()
}

/// Net position: money in, minus money out, minus principal parked in
/// investments, plus unrealised gains. Losses are not subtracted.
pub fn net_total(
    total_income: f64,
    total_expenses: f64,
    total_invested: f64,
    total_gain: f64,
) -> f64 {
    total_income - total_expenses - total_invested + total_gain.max(0.0)
}

/// Everything the dashboard shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub month: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_invested: f64,
    pub total_current: f64,
    pub total_gain: f64,
    pub gain_percent: f64,
    pub net_total: f64,
    pub month_income: f64,
    pub month_expenses: f64,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub expenses_by_member: BTreeMap<String, f64>,
    pub income_by_category: BTreeMap<String, f64>,
    pub investments_by_type: BTreeMap<String, TypeTotals>,
    pub expense_trend: Vec<MonthTotal>,
}

impl DashboardSummary {
    pub fn compute<I: Transaction, E: Transaction>(
        investments: &[Investment],
        incomes: &[I],
        expenses: &[E],
        month: &str,
        trend_months: usize,
        today: NaiveDate,
    ) -> Self {
        let total_income = total_amount(incomes);
        let total_expenses = total_amount(expenses);
        let total_invested = total_invested(investments);
        let total_gain = total_gain(investments);

        Self {
            month: month.to_string(),
            total_income,
            total_expenses,
            total_invested,
            total_current: total_current(investments),
            total_gain,
            gain_percent: gain_percent(investments),
            net_total: net_total(total_income, total_expenses, total_invested, total_gain),
            month_income: sum_for_month(incomes, month),
            month_expenses: sum_for_month(expenses, month),
            expenses_by_category: group_by_category(expenses),
            expenses_by_member: group_by_member(expenses),
            income_by_category: group_by_category(incomes),
            investments_by_type: group_investments_by_type(investments),
            expense_trend: monthly_trend_until(expenses, trend_months, today),
        }
    }

    pub fn month_savings(&self) -> f64 {
        self.month_income - self.month_expenses
    }
}
