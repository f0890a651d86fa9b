// Generic record store with write-through persistence

use crate::kv::KeyValueStore;
use crate::record::Record;
use chrono::NaiveDate;
use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Today's date in local time
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Owns one collection and mirrors it to a key-value store
///
/// Every effective mutation serializes the whole new collection and writes
/// it under `T::storage_key()` before the in-memory state is replaced, so a
/// failed write leaves the store unchanged.
pub struct Store<T: Record, K: KeyValueStore> {
    kv: K,
    records: Vec<T>,
    clock: fn() -> NaiveDate,
}

impl<T: Record, K: KeyValueStore> Store<T, K> {
    /// Load the collection, seeding it with `T::seed()` if nothing usable is stored
    pub fn open(kv: K) -> Result<Self> {
        Self::open_with_seed(kv, T::seed())
    }

    /// Load the collection, falling back to `seed`
    ///
    /// Absent or malformed stored JSON is replaced by `seed`, which is
    /// persisted immediately.
    pub fn open_with_seed(kv: K, seed: Vec<T>) -> Result<Self> {
        let key = T::storage_key();
        let stored = kv.get(key).with_context(|| format!("Failed to read collection {}", key))?;

        let loaded = match stored {
            Some(json) => match serde_json::from_str::<Vec<T>>(&json) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!(key, error = ?e, "Stored collection is malformed, falling back to seed");
                    None
                }
            },
            None => None,
        };

        let mut store = Self {
            kv,
            records: Vec::new(),
            clock: local_today,
        };

        match loaded {
            Some(records) => {
                info!(key, count = records.len(), "Loaded collection");
                store.records = records;
            }
            None => {
                info!(key, count = seed.len(), "Seeding collection");
                store.commit(seed)?;
            }
        }

        Ok(store)
    }

    /// Use a fixed clock for date stamps
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The underlying key-value store
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Id the next added record receives: `max(existing, 0) + 1`
    pub fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id()).max().unwrap_or(0) + 1
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a record built from `payload`, returning its id
    pub fn add(&mut self, payload: T::Payload) -> Result<u64> {
        let id = self.next_id();
        let record = T::from_payload(id, payload, self.today());

        let mut next = self.records.clone();
        next.push(record);
        self.commit(next)?;

        debug!(key = T::storage_key(), id, "add: record appended");
        Ok(id)
    }

    /// Overwrite a record's fields in place
    ///
    /// Returns `false` without writing when no record has this id.
    pub fn update(&mut self, id: u64, payload: T::Payload) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(key = T::storage_key(), id, "update: no such record");
            return Ok(false);
        };

        let mut next = self.records.clone();
        next[index].apply(payload, self.today());
        self.commit(next)?;

        debug!(key = T::storage_key(), id, "update: record replaced");
        Ok(true)
    }

    /// Remove one record
    ///
    /// Returns `false` without writing when no record has this id, so a
    /// repeated remove is a no-op.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        if self.position(id).is_none() {
            debug!(key = T::storage_key(), id, "remove: no such record");
            return Ok(false);
        }

        let next = self.records.iter().filter(|r| r.id() != id).cloned().collect();
        self.commit(next)?;

        debug!(key = T::storage_key(), id, "remove: record removed");
        Ok(true)
    }

    /// Remove every record whose id is listed, returning how many were removed
    pub fn remove_many(&mut self, ids: &[u64]) -> Result<usize> {
        let doomed: HashSet<u64> = ids.iter().copied().collect();
        let next: Vec<T> = self.records.iter().filter(|r| !doomed.contains(&r.id())).cloned().collect();

        let removed = self.records.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }
        self.commit(next)?;

        debug!(key = T::storage_key(), removed, "remove_many: records removed");
        Ok(removed)
    }

    /// Replace the whole collection
    pub fn replace_all(&mut self, records: Vec<T>) -> Result<()> {
        debug!(key = T::storage_key(), count = records.len(), "replace_all");
        self.commit(records)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Persist `next`, then make it the in-memory collection
    ///
    /// Refuses a collection holding any record that fails `validate`, so
    /// nothing is written that a later `open` could not load.
    fn commit(&mut self, next: Vec<T>) -> Result<()> {
        let key = T::storage_key();
        for record in &next {
            record
                .validate()
                .with_context(|| format!("Refusing to persist {} {}", T::noun(), record.id()))?;
        }
        let json = serde_json::to_string(&next).context("Failed to serialize collection")?;
        self.kv
            .set(key, &json)
            .with_context(|| format!("Failed to persist collection {}", key))?;
        self.records = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileKv, MemoryKv};
    use crate::models::{ChartPoint, ChartPointForm, User, UserForm, UserStatus, seed_users};
    use eyre::eyre;
    use tempfile::TempDir;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn open_users() -> Store<User, MemoryKv> {
        Store::open(MemoryKv::new()).unwrap().with_clock(fixed_today)
    }

    fn form(name: &str) -> UserForm {
        UserForm {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            location: "Boston, USA".to_string(),
            ..UserForm::default()
        }
    }

    fn stored_ids(store: &Store<User, MemoryKv>) -> Vec<u64> {
        let json = store.kv().get("users-data").unwrap().unwrap();
        let users: Vec<User> = serde_json::from_str(&json).unwrap();
        users.iter().map(|u| u.id).collect()
    }

    /// Accepts reads, refuses every write
    struct ReadOnlyKv(MemoryKv);

    impl KeyValueStore for ReadOnlyKv {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(eyre!("storage is read-only"))
        }
    }

    #[test]
    fn test_open_seeds_and_persists() {
        let store = open_users();
        assert_eq!(store.len(), 5);
        assert_eq!(store.kv().writes(), 1);
        assert_eq!(stored_ids(&store), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_open_loads_stored_collection() {
        let json = serde_json::to_string(&seed_users()[..2]).unwrap();
        let store: Store<User, _> = Store::open(MemoryKv::new().with_entry("users-data", &json)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.kv().writes(), 0);
    }

    #[test]
    fn test_open_malformed_falls_back_to_seed() {
        let store: Store<User, _> = Store::open(MemoryKv::new().with_entry("users-data", "{not json")).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(store.kv().writes(), 1);
        assert_eq!(stored_ids(&store), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_add_assigns_next_id() {
        let mut store = open_users();
        let id = store.add(form("Dana")).unwrap();
        assert_eq!(id, 6);
        assert_eq!(store.len(), 6);

        let added = store.get(6).unwrap();
        assert_eq!(added.name, "Dana");
        assert_eq!(added.join_date, fixed_today());
        assert_eq!(stored_ids(&store), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_add_uses_max_not_len() {
        let mut store = open_users();
        store.remove(2).unwrap();
        // Four records left, highest id still 5
        assert_eq!(store.add(form("Eve")).unwrap(), 6);

        let mut empty: Store<User, _> = Store::open_with_seed(MemoryKv::new(), Vec::new()).unwrap();
        assert_eq!(empty.add(form("First")).unwrap(), 1);
    }

    #[test]
    fn test_update_keeps_id_and_position() {
        let mut store = open_users();
        let mut payload = store.get(3).unwrap().to_payload();
        payload.name = "Robert Johnson".to_string();
        payload.status = UserStatus::Active;
        payload.orders = 99;

        assert!(store.update(3, payload).unwrap());
        assert_eq!(store.len(), 5);

        let user = &store.records()[2];
        assert_eq!(user.id, 3);
        assert_eq!(user.name, "Robert Johnson");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.orders, 99);
        assert_eq!(user.last_login, fixed_today());
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = open_users();
        let writes = store.kv().writes();
        assert!(!store.update(77, form("Ghost")).unwrap());
        assert_eq!(store.kv().writes(), writes);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = open_users();
        assert!(store.remove(3).unwrap());
        let writes = store.kv().writes();
        let after_first: Vec<u64> = store.records().iter().map(|u| u.id).collect();

        assert!(!store.remove(3).unwrap());
        assert_eq!(store.kv().writes(), writes);
        let after_second: Vec<u64> = store.records().iter().map(|u| u.id).collect();
        assert_eq!(after_first, after_second);
        assert_eq!(after_second, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_remove_many() {
        let mut store = open_users();
        assert_eq!(store.remove_many(&[2, 4, 40]).unwrap(), 2);
        assert_eq!(stored_ids(&store), vec![1, 3, 5]);

        let writes = store.kv().writes();
        assert_eq!(store.remove_many(&[2, 4]).unwrap(), 0);
        assert_eq!(store.kv().writes(), writes);
    }

    #[test]
    fn test_replace_all() {
        let mut store = open_users();
        store.replace_all(seed_users()[..1].to_vec()).unwrap();
        assert_eq!(stored_ids(&store), vec![1]);
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let json = serde_json::to_string(&seed_users()).unwrap();
        let kv = ReadOnlyKv(MemoryKv::new().with_entry("users-data", &json));
        let mut store: Store<User, _> = Store::open(kv).unwrap();

        assert!(store.add(form("Nope")).is_err());
        assert!(store.remove(1).is_err());
        assert_eq!(store.len(), 5);
        assert!(store.get(1).is_some());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let mut store: Store<User, _> = Store::open(FileKv::open(temp.path()).unwrap()).unwrap();
            store.add(form("Dana")).unwrap();
            store.remove(1).unwrap();
        }

        let store: Store<User, _> = Store::open(FileKv::open(temp.path()).unwrap()).unwrap();
        let ids: Vec<u64> = store.records().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_non_finite_value_is_refused_and_points_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let point = |label: &str, value: f64| ChartPointForm {
            label: label.to_string(),
            value,
        };

        {
            let mut store: Store<ChartPoint, _> = Store::open(FileKv::open(temp.path()).unwrap()).unwrap();
            assert_eq!(store.add(point("Extra", 1.0)).unwrap(), 13);

            assert!(store.add(point("Bad", f64::NAN)).is_err());
            assert!(store.add(point("Huge", f64::INFINITY)).is_err());
            assert!(store.update(13, point("Extra", f64::NEG_INFINITY)).is_err());
            assert_eq!(store.len(), 13);
            assert_eq!(store.get(13).unwrap().value, 1.0);
        }

        let store: Store<ChartPoint, _> = Store::open(FileKv::open(temp.path()).unwrap()).unwrap();
        assert_eq!(store.len(), 13);
        assert_eq!(store.get(13).unwrap().label, "Extra");
    }
}
