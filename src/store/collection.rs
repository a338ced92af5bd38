use super::file;
use crate::core::error::{Committed, PersistError, StoreError};
use crate::core::models::Record;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};
use uuid::Uuid;

/// One record collection, authoritative in memory and mirrored to a JSON file.
///
/// Readers share the lock. Writers hold it across the in-memory change and
/// the file write, so writes to the same file never interleave.
pub struct RecordStore<T: Record> {
    path: PathBuf,
    records: RwLock<Vec<T>>,
}

impl<T: Record> RecordStore<T> {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(T::FILE_NAME);
        let records: Vec<T> = file::load(&path)?.unwrap_or_default();
        info!("Loaded {} {} records", records.len(), T::KIND);
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mirrors `records` to disk; must be called with the write lock held.
    fn persist(&self, records: &[T]) -> Option<PersistError> {
        match file::save(&self.path, records) {
            Ok(()) => None,
            Err(e) => {
                warn!("Keeping {} changes in memory only: {e}", T::KIND);
                Some(e)
            }
        }
    }

    /// Snapshot of all records in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read().iter().find(|r| r.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Admits a new record under a fresh id.
    pub fn add(&self, mut record: T) -> Result<Committed<T>, StoreError> {
        record.validate()?;

        let now = Utc::now();
        record.stamp(Uuid::new_v4().to_string(), now, now);

        let mut records = self.write();
        records.push(record.clone());
        let warning = self.persist(&records);
        Ok(Committed::new(record, warning))
    }

    /// Replaces every field of record `id` except its id and creation time.
    pub fn update(&self, id: &str, mut record: T) -> Result<Committed<T>, StoreError> {
        let mut records = self.write();
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })?;

        record.validate()?;
        record.stamp(id.to_string(), records[index].created_at(), Utc::now());
        records[index] = record.clone();

        let warning = self.persist(&records);
        Ok(Committed::new(record, warning))
    }

    /// Removes record `id`, returning it.
    pub fn delete(&self, id: &str) -> Result<Committed<T>, StoreError> {
        let mut records = self.write();
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })?;

        let removed = records.remove(index);
        let warning = self.persist(&records);
        Ok(Committed::new(removed, warning))
    }

    /// Swaps in a whole collection as-is, ids and timestamps included.
    pub fn replace_all(&self, incoming: Vec<T>) -> Committed<usize> {
        let mut records = self.write();
        *records = incoming;
        let warning = self.persist(&records);
        Committed::new(records.len(), warning)
    }

    /// Offers every record to `patch` under one write lock.
    ///
    /// `patch` returns the replacement for records it changes. Replacements
    /// that fail validation are dropped. Changed records keep their id and
    /// creation time and get a new update time; the file is written once.
    pub(crate) fn patch_many<F>(&self, mut patch: F) -> Committed<usize>
    where
        F: FnMut(&T) -> Option<T>,
    {
        let mut records = self.write();
        let now = Utc::now();
        let mut changed = 0;

        for slot in records.iter_mut() {
            let Some(mut replacement) = patch(slot) else {
                continue;
            };
            if let Err(e) = replacement.validate() {
                warn!("Skipping {} {}: {e}", T::KIND, slot.id());
                continue;
            }
            replacement.stamp(slot.id().to_string(), slot.created_at(), now);
            *slot = replacement;
            changed += 1;
        }

        let warning = if changed > 0 {
            self.persist(&records)
        } else {
            None
        };
        Committed::new(changed, warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Expense, Investment};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn fund(name: &str) -> Investment {
        Investment {
            name: name.to_string(),
            kind: "Mutual Fund".to_string(),
            invested: 10000.0,
            current: 10000.0,
            date: "2025-01-01".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_assigns_id_and_timestamps() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();

        let mut input = fund("Fund A");
        input.id = "client-chosen".to_string();
        let added = store.add(input).unwrap().into_result().unwrap();

        assert_ne!(added.id, "client-chosen");
        assert!(Uuid::parse_str(&added.id).is_ok());
        assert_eq!(added.created_at, added.updated_at);
        assert_eq!(store.list(), vec![added]);
    }

    #[test]
    fn test_invalid_add_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();

        let mut input = fund("Fund A");
        input.invested = 0.0;
        let err = store.add(input).unwrap_err();

        assert!(matches!(err, StoreError::Validation(ref v) if v.field == "invested"));
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let original = store.add(fund("Fund A")).unwrap().value;

        let mut payload = fund("Fund A");
        payload.id = "someone-else".to_string();
        payload.current = 11000.0;
        let updated = store.update(&original.id, payload).unwrap().value;

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(store.get(&original.id).unwrap().current, 11000.0);
        assert!(store.get("someone-else").is_none());
    }

    #[test]
    fn test_investment_lifecycle() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();

        let added = store.add(fund("Fund A")).unwrap().into_result().unwrap();
        assert_eq!(store.len(), 1);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut payload = added.clone();
        payload.current = 11000.0;
        let updated = store
            .update(&added.id, payload)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(updated.current, 11000.0);
        assert_eq!(updated.created_at, added.created_at);
        assert!(updated.updated_at > updated.created_at);

        store.delete(&added.id).unwrap().into_result().unwrap();
        assert!(store.is_empty());
        assert!(RecordStore::<Investment>::open(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_infinite_amount_never_reaches_disk() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        store.add(fund("Fund A")).unwrap();

        let mut input = fund("Fund B");
        input.invested = f64::INFINITY;
        input.current = f64::INFINITY;
        assert!(matches!(store.add(input), Err(StoreError::Validation(_))));

        let reopened = RecordStore::<Investment>::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let err = store.update("nope", fund("Fund A")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "investment", .. }));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_invalid_update_keeps_previous_record() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let original = store.add(fund("Fund A")).unwrap().value;

        let mut payload = fund("");
        payload.current = 1.0;
        assert!(store.update(&original.id, payload).is_err());
        assert_eq!(store.get(&original.id), Some(original));
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let a = store.add(fund("A")).unwrap().value;
        let b = store.add(fund("B")).unwrap().value;

        let removed = store.delete(&a.id).unwrap().value;
        assert_eq!(removed.id, a.id);
        assert_eq!(store.list(), vec![b]);
        assert!(matches!(
            store.delete(&a.id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_mutations_are_mirrored_to_disk() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let a = store.add(fund("A")).unwrap().value;
        store.add(fund("B")).unwrap();
        store.delete(&a.id).unwrap();

        let reopened = RecordStore::<Investment>::open(dir.path()).unwrap();
        assert_eq!(reopened.list(), store.list());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw.is_array());
        assert_eq!(raw[0]["name"], "B");
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        // A directory where the file should be makes every write fail.
        std::fs::create_dir(store.path()).unwrap();

        let committed = store.add(fund("A")).unwrap();
        assert!(!committed.is_durable());
        assert_eq!(store.len(), 1);

        let err = store.add(fund("B")).unwrap().into_result().unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert!(!err.is_caller_error());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let dir = tempdir().unwrap();
        let store = Arc::new(RecordStore::<Expense>::open(dir.path()).unwrap());
        let n = 32;

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let expense = Expense {
                        description: format!("expense {i}"),
                        amount: 10.0 + i as f64,
                        category: "Food".to_string(),
                        date: "2025-01-15".to_string(),
                        added_by: "Asha".to_string(),
                        ..Default::default()
                    };
                    store.add(expense).unwrap().into_result().unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = store.list();
        assert_eq!(records.len(), n);
        let ids: HashSet<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), n);

        let on_disk = RecordStore::<Expense>::open(dir.path()).unwrap();
        assert_eq!(on_disk.len(), n);
    }

    #[test]
    fn test_patch_many_validates_and_restamps() {
        let dir = tempdir().unwrap();
        let store = RecordStore::<Investment>::open(dir.path()).unwrap();
        let a = store.add(fund("A")).unwrap().value;
        let b = store.add(fund("B")).unwrap().value;

        let changed = store
            .patch_many(|inv| {
                let mut next = inv.clone();
                if inv.id == a.id {
                    next.current = 12345.0;
                } else {
                    next.current = -1.0;
                }
                Some(next)
            })
            .into_result()
            .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(store.get(&a.id).unwrap().current, 12345.0);
        assert_eq!(store.get(&b.id), Some(b));
    }
}
