//! Record types held by the store and exchanged through export bundles.

use crate::core::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Version tag written into every export bundle.
pub const BUNDLE_VERSION: &str = "1.0";

/// A record kept in one of the store's collections.
///
/// Ids and timestamps are owned by the store: whatever a caller puts in
/// them is overwritten by [`Record::stamp`] before the record is admitted.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Singular, human readable name used in logs and errors.
    const KIND: &'static str;
    /// File name of the collection inside the data directory.
    const FILE_NAME: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn stamp(&mut self, id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Money flowing in or out on a given day, attributed to a member.
pub trait Transaction {
    fn amount(&self) -> f64;
    /// Date in `YYYY-MM-DD` form.
    fn date(&self) -> &str;
    fn category(&self) -> &str;
    fn added_by(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub invested: f64,
    pub current: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<f64>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Investment {
    /// Scheme code usable for a NAV lookup, if any.
    pub fn scheme_code(&self) -> Option<&str> {
        self.scheme_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Units held, when a positive quantity has been recorded.
    pub fn held_units(&self) -> Option<f64> {
        self.units.filter(|units| *units > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub added_by: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub added_by: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal, $file:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;
            const FILE_NAME: &'static str = $file;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn stamp(&mut self, id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
                self.id = id;
                self.created_at = created_at;
                self.updated_at = updated_at;
            }

            fn validate(&self) -> Result<(), ValidationError> {
                <$ty>::validate(self)
            }
        }
    };
}

impl_record!(Investment, "investment", "investments.json");
impl_record!(Income, "income", "incomes.json");
impl_record!(Expense, "expense", "expenses.json");

impl Transaction for Income {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn added_by(&self) -> &str {
        &self.added_by
    }
}

impl Transaction for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn added_by(&self) -> &str {
        &self.added_by
    }
}

/// User editable lists backing the pickers of the dashboard.
///
/// `Default` is the empty value; [`Settings::seeded`] is what a fresh data
/// directory starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub investment_types: Vec<String>,
    #[serde(default)]
    pub income_categories: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn seeded() -> Self {
        Self {
            categories: owned(&[
                "Food",
                "Transport",
                "Utilities",
                "Shopping",
                "Entertainment",
                "Health",
                "EMI",
                "Other",
            ]),
            investment_types: owned(&[
                "Mutual Fund",
                "Stocks",
                "FD",
                "Gold",
                "PPF",
                "NPS",
                "Chit",
                "Other",
            ]),
            income_categories: owned(&[
                "Salary", "Business", "Rental", "Interest", "Dividend", "Other",
            ]),
            payment_methods: owned(&["Cash", "UPI", "Online", "Card", "Bank Transfer"]),
            members: owned(&["Family"]),
        }
    }

    /// Bundles signal "settings present" through a non-empty category list.
    pub fn is_present(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Full snapshot used for backup and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investment_wire_names() {
        let json = r#"{
            "id": "abc",
            "name": "HDFC Flexi Cap",
            "type": "Mutual Fund",
            "invested": 10000.0,
            "current": 12000.0,
            "date": "2025-01-01",
            "schemeCode": "118955",
            "units": 12.5,
            "createdAt": "2025-01-01T10:00:00Z",
            "updatedAt": "2025-01-02T10:00:00Z"
        }"#;

        let investment: Investment = serde_json::from_str(json).unwrap();
        assert_eq!(investment.kind, "Mutual Fund");
        assert_eq!(investment.scheme_code(), Some("118955"));
        assert_eq!(investment.held_units(), Some(12.5));

        let value = serde_json::to_value(&investment).unwrap();
        assert_eq!(value["type"], "Mutual Fund");
        assert_eq!(value["schemeCode"], "118955");
        assert_eq!(value["createdAt"], "2025-01-01T10:00:00Z");
    }

    #[test]
    fn test_legacy_records_load_with_defaults() {
        // Older files carry empty scheme codes and zero units, and no payment method.
        let investment: Investment = serde_json::from_str(
            r#"{"id":"1","name":"FD","type":"FD","invested":5.0,"current":5.0,"date":"2024-01-01","schemeCode":"","units":0}"#,
        )
        .unwrap();
        assert_eq!(investment.scheme_code(), None);
        assert_eq!(investment.held_units(), None);

        let expense: Expense = serde_json::from_str(
            r#"{"id":"2","desc":"Tea","amount":20,"category":"Food","date":"2024-01-01","addedBy":"Asha"}"#,
        )
        .unwrap();
        assert_eq!(expense.description, "Tea");
        assert_eq!(expense.payment_method, "");
    }

    #[test]
    fn test_bundle_without_settings_is_not_present() {
        let bundle: ExportBundle = serde_json::from_str(
            r#"{"version":"1.0","exportedAt":"2025-01-01T00:00:00Z","investments":[]}"#,
        )
        .unwrap();
        assert!(!bundle.settings.is_present());
        assert!(bundle.incomes.is_empty());
        assert!(Settings::seeded().is_present());
    }
}
