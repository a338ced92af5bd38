//! Domain types, rules and calculations

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod models;
pub mod nav;
pub mod validation;

// Re-export main types for cleaner imports
pub use error::{Committed, PersistError, PriceUnavailable, StoreError};
pub use models::{ExportBundle, Expense, Income, Investment, Record, Settings, Transaction};
pub use nav::NavProvider;
pub use validation::ValidationError;
