pub mod collection;
mod file;
pub mod settings;

use crate::core::error::{Committed, PersistError, PriceUnavailable, StoreError};
use crate::core::models::{BUNDLE_VERSION, ExportBundle, Expense, Income, Investment};
use crate::core::nav::{NavProvider, refresh_one};
use chrono::Utc;
use collection::RecordStore;
use futures::future::join_all;
use serde::Serialize;
use settings::SettingsStore;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Handle to all persisted finance data.
///
/// Each collection has its own lock and file, so writers of different
/// collections never wait on each other. Construct once and share by
/// reference (or `Arc`).
pub struct FinanceStore {
    investments: RecordStore<Investment>,
    incomes: RecordStore<Income>,
    expenses: RecordStore<Expense>,
    settings: SettingsStore,
}

/// Result of applying a batch of NAV updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavRefreshSummary {
    pub updated: usize,
    pub total: usize,
}

/// Per-investment outcome of a server side NAV refresh.
#[derive(Debug)]
pub struct NavRefreshOutcome {
    pub id: String,
    pub name: String,
    pub result: Result<f64, PriceUnavailable>,
}

#[derive(Debug)]
pub struct NavRefreshReport {
    pub outcomes: Vec<NavRefreshOutcome>,
    pub summary: NavRefreshSummary,
    pub warning: Option<PersistError>,
}

impl FinanceStore {
    /// Opens (creating if needed) the data directory and loads every file.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::Load {
            path: data_dir.clone(),
            reason: e.to_string(),
        })?;
        info!("Opening data directory {}", data_dir.display());

        Ok(Self {
            investments: RecordStore::open(&data_dir)?,
            incomes: RecordStore::open(&data_dir)?,
            expenses: RecordStore::open(&data_dir)?,
            settings: SettingsStore::open(&data_dir)?,
        })
    }

    pub fn investments(&self) -> &RecordStore<Investment> {
        &self.investments
    }

    pub fn incomes(&self) -> &RecordStore<Income> {
        &self.incomes
    }

    pub fn expenses(&self) -> &RecordStore<Expense> {
        &self.expenses
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Snapshot of every collection for backup.
    pub fn export(&self) -> ExportBundle {
        ExportBundle {
            version: BUNDLE_VERSION.to_string(),
            exported_at: Utc::now(),
            investments: self.investments.list(),
            incomes: self.incomes.list(),
            expenses: self.expenses.list(),
            settings: self.settings.get(),
        }
    }

    /// Restores a bundle collection by collection.
    ///
    /// A non-empty collection replaces the stored one wholesale; an empty one
    /// leaves it alone. Settings are replaced only when their category list is
    /// non-empty. Returns the names of replaced collections. If some files
    /// could not be written the replacement stays in memory and the call
    /// fails with `PartialImport`.
    pub fn import(&self, bundle: ExportBundle) -> Result<Vec<String>, StoreError> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut record = |name: &str, warning: Option<PersistError>| match warning {
            None => succeeded.push(name.to_string()),
            Some(e) => {
                warn!("Import of {name} not persisted: {e}");
                failed.push(name.to_string());
            }
        };

        if !bundle.investments.is_empty() {
            record(
                "investments",
                self.investments.replace_all(bundle.investments).warning,
            );
        }
        if !bundle.incomes.is_empty() {
            record("incomes", self.incomes.replace_all(bundle.incomes).warning);
        }
        if !bundle.expenses.is_empty() {
            record(
                "expenses",
                self.expenses.replace_all(bundle.expenses).warning,
            );
        }
        if bundle.settings.is_present() {
            record("settings", self.settings.set(bundle.settings).warning);
        }

        if failed.is_empty() {
            info!("Imported {}", succeeded.join(", "));
            Ok(succeeded)
        } else {
            Err(StoreError::PartialImport { succeeded, failed })
        }
    }

    /// Applies client supplied investment updates, skipping any without an
    /// id, with an unknown id, or failing validation. Ids and creation times
    /// of stored records are kept.
    pub fn apply_nav_updates(&self, updates: Vec<Investment>) -> Committed<NavRefreshSummary> {
        let total = updates.len();
        let mut by_id: HashMap<String, Investment> = updates
            .into_iter()
            .filter(|inv| !inv.id.is_empty())
            .map(|inv| (inv.id.clone(), inv))
            .collect();

        let committed = self.investments.patch_many(|stored| by_id.remove(&stored.id));
        for id in by_id.keys() {
            warn!("NAV update for unknown investment {id} skipped");
        }

        Committed::new(
            NavRefreshSummary {
                updated: committed.value,
                total,
            },
            committed.warning,
        )
    }

    /// Revalues every investment with a scheme code at the latest NAV.
    ///
    /// Lookups run concurrently and independently; a record whose price
    /// cannot be resolved is reported and left unchanged.
    pub async fn refresh_navs(&self, provider: &(dyn NavProvider + Send + Sync)) -> NavRefreshReport {
        let eligible: Vec<Investment> = self
            .investments
            .list()
            .into_iter()
            .filter(|inv| inv.scheme_code().is_some())
            .collect();

        let results = join_all(eligible.iter().map(|inv| refresh_one(inv, provider))).await;

        let mut revalued = HashMap::new();
        let mut outcomes = Vec::with_capacity(eligible.len());
        for (inv, result) in eligible.iter().zip(results) {
            let result = match result {
                Ok(refreshed) => {
                    let current = refreshed.current;
                    revalued.insert(inv.id.clone(), (refreshed.units, current));
                    Ok(current)
                }
                Err(e) => {
                    warn!("Skipping NAV refresh of {}: {e}", inv.name);
                    Err(e)
                }
            };
            outcomes.push(NavRefreshOutcome {
                id: inv.id.clone(),
                name: inv.name.clone(),
                result,
            });
        }

        // Only the valuation fields are written back, so edits made while the
        // lookups were in flight are kept.
        let committed = self.investments.patch_many(|stored| {
            let (units, current) = revalued.remove(&stored.id)?;
            let mut next = stored.clone();
            next.units = units;
            next.current = current;
            Some(next)
        });

        NavRefreshReport {
            outcomes,
            summary: NavRefreshSummary {
                updated: committed.value,
                total: eligible.len(),
            },
            warning: committed.warning,
        }
    }
}
