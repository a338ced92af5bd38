//! Admission rules for records entering the store.

use crate::core::models::{Expense, Income, Investment};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: &str) -> Self {
        Self {
            field,
            reason: reason.to_string(),
        }
    }
}

fn require_text(field: &'static str, value: &str, reason: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, reason));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64, reason: &str) -> Result<(), ValidationError> {
    // NaN fails the comparison as well; infinities cannot be written as JSON.
    if !(value.is_finite() && value > 0.0) {
        return Err(ValidationError::new(field, reason));
    }
    Ok(())
}

impl Investment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, "investment name is required")?;
        require_text("type", &self.kind, "investment type is required")?;
        require_positive(
            "invested",
            self.invested,
            "invested amount must be greater than 0",
        )?;
        if !self.current.is_finite() {
            return Err(ValidationError::new(
                "current",
                "current value must be a finite number",
            ));
        }
        if self.current < 0.0 {
            return Err(ValidationError::new(
                "current",
                "current value cannot be negative",
            ));
        }
        require_text("date", &self.date, "investment date is required")
    }
}

impl Income {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("source", &self.source, "income source is required")?;
        require_positive("amount", self.amount, "income amount must be greater than 0")?;
        require_text("category", &self.category, "income category is required")?;
        require_text("date", &self.date, "income date is required")?;
        require_text(
            "addedBy",
            &self.added_by,
            "added by (member name) is required",
        )
    }
}

impl Expense {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(
            "desc",
            &self.description,
            "expense description is required",
        )?;
        require_positive("amount", self.amount, "expense amount must be greater than 0")?;
        require_text("category", &self.category, "expense category is required")?;
        require_text("date", &self.date, "expense date is required")?;
        require_text(
            "addedBy",
            &self.added_by,
            "added by (member name) is required",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn investment() -> Investment {
        Investment {
            name: "Fund A".to_string(),
            kind: "Mutual Fund".to_string(),
            invested: 0.01,
            current: 0.0,
            date: "2025-01-01".to_string(),
            ..Default::default()
        }
    }

    fn expense() -> Expense {
        Expense {
            description: "Groceries".to_string(),
            amount: 450.0,
            category: "Food".to_string(),
            date: "2025-01-15".to_string(),
            added_by: "Asha".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_investment_minimum_amount_accepted() {
        assert_eq!(investment().validate(), Ok(()));
    }

    #[test]
    fn test_investment_rejects_non_positive_invested() {
        for invested in [0.0, -10.0, f64::NAN] {
            let inv = Investment {
                invested,
                ..investment()
            };
            let err = inv.validate().unwrap_err();
            assert_eq!(err.field, "invested");
        }
    }

    #[test]
    fn test_investment_current_may_be_zero_but_not_negative() {
        let total_loss = Investment {
            current: 0.0,
            ..investment()
        };
        assert!(total_loss.validate().is_ok());

        let negative = Investment {
            current: -1.0,
            ..investment()
        };
        assert_eq!(negative.validate().unwrap_err().field, "current");
    }

    #[test]
    fn test_infinite_values_are_rejected() {
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            let inv = Investment {
                invested: value,
                ..investment()
            };
            assert_eq!(inv.validate().unwrap_err().field, "invested");

            let inv = Investment {
                current: value,
                ..investment()
            };
            assert_eq!(inv.validate().unwrap_err().field, "current");

            let exp = Expense {
                amount: value,
                ..expense()
            };
            assert_eq!(exp.validate().unwrap_err().field, "amount");

            let inc = Income {
                source: "Salary".to_string(),
                amount: value,
                category: "Salary".to_string(),
                date: "2025-01-01".to_string(),
                added_by: "Asha".to_string(),
                ..Default::default()
            };
            assert_eq!(inc.validate().unwrap_err().field, "amount");
        }

        let nan_current = Investment {
            current: f64::NAN,
            ..investment()
        };
        assert_eq!(nan_current.validate().unwrap_err().field, "current");
    }

    #[test]
    fn test_investment_requires_name_type_and_date() {
        let unnamed = Investment {
            name: "  ".to_string(),
            ..investment()
        };
        assert_eq!(unnamed.validate().unwrap_err().field, "name");

        let untyped = Investment {
            kind: String::new(),
            ..investment()
        };
        assert_eq!(untyped.validate().unwrap_err().field, "type");

        let undated = Investment {
            date: String::new(),
            ..investment()
        };
        assert_eq!(undated.validate().unwrap_err().field, "date");
    }

    #[test]
    fn test_expense_requires_member() {
        assert!(expense().validate().is_ok());
        let anonymous = Expense {
            added_by: String::new(),
            ..expense()
        };
        let err = anonymous.validate().unwrap_err();
        assert_eq!(err.field, "addedBy");
        assert_eq!(
            err.to_string(),
            "invalid addedBy: added by (member name) is required"
        );
    }

    #[test]
    fn test_income_rules() {
        let income = Income {
            source: "Salary".to_string(),
            amount: 50000.0,
            category: "Salary".to_string(),
            date: "2025-01-01".to_string(),
            added_by: "Ravi".to_string(),
            ..Default::default()
        };
        assert!(income.validate().is_ok());

        let free = Income {
            amount: 0.0,
            ..income.clone()
        };
        assert_eq!(free.validate().unwrap_err().field, "amount");

        let uncategorised = Income {
            category: String::new(),
            ..income
        };
        assert_eq!(uncategorised.validate().unwrap_err().field, "category");
    }
}
