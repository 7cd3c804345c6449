//! User-scoped typed access to the document store.

pub mod paths;

use std::{collections::BTreeMap, sync::Arc};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    domain::{CategoryLimits, Expense, Income, Transaction},
    errors::{OikosError, Result},
    store::{DocumentStore, PathUpdate, StorePath, Subscription},
};

pub use paths::{Collection, Record, SettingsKey};

/// Handle bound to one user's subtree, `users/{uid}/…`.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    root: StorePath,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        let root = StorePath::root()
            .child(paths::USERS_ROOT)?
            .child(user_id.trim())
            .map_err(|_| OikosError::InvalidInput(format!("invalid user id `{user_id}`")))?;
        Ok(Self {
            store,
            user_id: user_id.trim().to_string(),
            root,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn root(&self) -> &StorePath {
        &self.root
    }

    pub fn collection_path(&self, collection: Collection) -> Result<StorePath> {
        self.root.child(collection.key())
    }

    pub fn record_path(&self, collection: Collection, id: &str) -> Result<StorePath> {
        self.collection_path(collection)?.child(id)
    }

    pub fn settings_path(&self, key: SettingsKey) -> Result<StorePath> {
        self.root.child(paths::SETTINGS)?.child(key.key())
    }

    /// Every record in the collection of `T`. Malformed entries are logged and skipped.
    pub fn list<T: Record>(&self) -> Result<Vec<T>> {
        let path = self.collection_path(T::COLLECTION)?;
        let value = self.store.get(&path)?;
        Ok(decode_collection(T::COLLECTION, value))
    }

    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        let path = self.record_path(T::COLLECTION, id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode_record(id, value)?)),
            None => Ok(None),
        }
    }

    pub fn save<T: Record>(&self, record: &T) -> Result<()> {
        let path = self.record_path(T::COLLECTION, record.id())?;
        debug!(path = %path, "saving record");
        self.store.set(&path, serde_json::to_value(record)?)
    }

    pub fn delete<T: Record>(&self, id: &str) -> Result<()> {
        let path = self.record_path(T::COLLECTION, id)?;
        self.store.remove(&path)
    }

    /// Calls `on_change` with the decoded collection now and after every change.
    pub fn watch<T, F>(&self, on_change: F) -> Result<Subscription>
    where
        T: Record,
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let path = self.collection_path(T::COLLECTION)?;
        let collection = T::COLLECTION;
        self.store.subscribe(
            &path,
            Arc::new(move |value| on_change(decode_collection(collection, value))),
        )
    }

    pub fn incomes(&self) -> Result<Vec<Income>> {
        self.list()
    }

    pub fn expenses(&self) -> Result<Vec<Expense>> {
        self.list()
    }

    /// Incomes and expenses merged, newest first.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut merged: Vec<Transaction> = self
            .incomes()?
            .into_iter()
            .map(Transaction::from)
            .chain(self.expenses()?.into_iter().map(Transaction::from))
            .collect();
        merged.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(merged)
    }

    pub fn category_limits(&self) -> Result<CategoryLimits> {
        let path = self.settings_path(SettingsKey::CategoryLimits)?;
        Ok(decode_limits(self.store.get(&path)?))
    }

    pub fn set_category_limit(&self, category: &str, limit: f64) -> Result<()> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(OikosError::InvalidInput(format!(
                "limit for `{category}` must be a non-negative amount"
            )));
        }
        let path = self.settings_path(SettingsKey::CategoryLimits)?.child(category)?;
        self.store.set(&path, Value::from(limit))
    }

    pub fn remove_category_limit(&self, category: &str) -> Result<()> {
        let path = self.settings_path(SettingsKey::CategoryLimits)?.child(category)?;
        self.store.remove(&path)
    }

    pub fn watch_category_limits<F>(&self, on_change: F) -> Result<Subscription>
    where
        F: Fn(CategoryLimits) + Send + Sync + 'static,
    {
        let path = self.settings_path(SettingsKey::CategoryLimits)?;
        self.store
            .subscribe(&path, Arc::new(move |value| on_change(decode_limits(value))))
    }

    /// Opaque string setting such as the visual mode or the stored API key.
    pub fn setting(&self, key: SettingsKey) -> Result<Option<String>> {
        let path = self.settings_path(key)?;
        Ok(self
            .store
            .get(&path)?
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    pub fn set_setting(&self, key: SettingsKey, value: Option<&str>) -> Result<()> {
        let path = self.settings_path(key)?;
        match value {
            Some(value) => self.store.set(&path, Value::from(value)),
            None => self.store.remove(&path),
        }
    }

    pub fn batch(&self) -> WriteBatch {
        WriteBatch {
            root: self.root.clone(),
            updates: Vec::new(),
        }
    }

    /// Commits every staged write of `batch` atomically.
    pub fn apply(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!(user = %self.user_id, writes = batch.len(), "applying write batch");
        self.store.update(batch.updates)
    }

    /// Removes the whole `users/{uid}` subtree.
    pub fn delete_all_user_data(&self) -> Result<()> {
        self.store.remove(&self.root)?;
        info!(user = %self.user_id, "deleted all user data");
        Ok(())
    }
}

/// Multi-path update relative to one user's root.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    root: StorePath,
    updates: Vec<PathUpdate>,
}

impl WriteBatch {
    pub fn put<T: Record>(mut self, record: &T) -> Result<Self> {
        let path = self
            .root
            .child(T::COLLECTION.key())?
            .child(record.id())?;
        self.updates.push((path, Some(serde_json::to_value(record)?)));
        Ok(self)
    }

    pub fn put_transaction(self, transaction: &Transaction) -> Result<Self> {
        match transaction {
            Transaction::Income(income) => self.put(income),
            Transaction::Expense(expense) => self.put(expense),
        }
    }

    pub fn delete<T: Record>(mut self, id: &str) -> Result<Self> {
        let path = self.root.child(T::COLLECTION.key())?.child(id)?;
        self.updates.push((path, None));
        Ok(self)
    }

    /// Replaces a whole collection with `records`, dropping everything else in it.
    pub fn replace_all<T: Record>(mut self, records: &[T]) -> Result<Self> {
        let path = self.root.child(T::COLLECTION.key())?;
        let mut map = Map::new();
        for record in records {
            map.insert(record.id().to_string(), serde_json::to_value(record)?);
        }
        let value = if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        };
        self.updates.push((path, value));
        Ok(self)
    }

    pub fn clear(mut self, collection: Collection) -> Result<Self> {
        let path = self.root.child(collection.key())?;
        self.updates.push((path, None));
        Ok(self)
    }

    pub fn category_limits(mut self, limits: &CategoryLimits) -> Result<Self> {
        let path = self
            .root
            .child(paths::SETTINGS)?
            .child(SettingsKey::CategoryLimits.key())?;
        let value = if limits.is_empty() {
            None
        } else {
            Some(serde_json::to_value(limits)?)
        };
        self.updates.push((path, value));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &StorePath> {
        self.updates.iter().map(|(path, _)| path)
    }
}

fn decode_collection<T: Record>(collection: Collection, value: Option<Value>) -> Vec<T> {
    let Some(Value::Object(entries)) = value else {
        return Vec::new();
    };
    let mut records = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        match decode_record::<T>(&key, entry) {
            Ok(record) => records.push(record),
            Err(err) => warn!(
                collection = %collection,
                key = %key,
                error = %err,
                "skipping malformed record"
            ),
        }
    }
    records
}

/// Records written by older clients may lack their `id`; the store key fills it in.
fn decode_record<T: Record>(key: &str, mut value: Value) -> Result<T> {
    if let Value::Object(map) = &mut value {
        let missing = match map.get("id") {
            None => true,
            Some(Value::String(id)) => id.is_empty(),
            Some(_) => false,
        };
        if missing {
            map.insert("id".into(), Value::from(key));
        }
    }
    Ok(serde_json::from_value(value)?)
}

fn decode_limits(value: Option<Value>) -> CategoryLimits {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(category, limit)| match limit.as_f64() {
            Some(limit) => Some((category, limit)),
            None => {
                warn!(category = %category, "ignoring non-numeric category limit");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Debt, RecurringTransaction};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    fn repo() -> (MemoryStore, UserRepository) {
        let store = MemoryStore::new();
        let repo = UserRepository::new(Arc::new(store.clone()), "u1").unwrap();
        (store, repo)
    }

    #[test]
    fn rejects_invalid_user_ids() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        assert!(UserRepository::new(Arc::clone(&store), "").is_err());
        assert!(UserRepository::new(store, "a.b").is_err());
    }

    #[test]
    fn records_are_scoped_to_the_user() {
        let (store, repo) = repo();
        let debt = Debt::new("Card", 1200.0, 12.0, 50.0);
        repo.save(&debt).unwrap();
        let raw = store
            .get(&StorePath::parse(&format!("users/u1/debts/{}", debt.id)).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(raw["interestRate"], json!(12.0));
        assert_eq!(repo.get::<Debt>(&debt.id).unwrap(), Some(debt.clone()));

        let other = UserRepository::new(Arc::new(store), "u2").unwrap();
        assert!(other.list::<Debt>().unwrap().is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let (store, repo) = repo();
        store
            .set(
                &StorePath::parse("users/u1/recurringTransactions").unwrap(),
                json!({
                    "ok": {"name": "Rent", "amount": 900.0, "type": "EXPENSE", "nextDueDate": 0},
                    "bad": {"name": "Broken", "amount": "lots"}
                }),
            )
            .unwrap();
        let templates: Vec<RecurringTransaction> = repo.list().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "ok");
    }

    #[test]
    fn batch_commits_all_paths() {
        let (_store, repo) = repo();
        let date = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let income = Income::new(100.0, date, "Salary");
        let expense = Expense::new(20.0, date, "Lunch", "Food");
        let mut limits = CategoryLimits::new();
        limits.insert("Food".into(), 300.0);
        let batch = repo
            .batch()
            .put(&income)
            .unwrap()
            .put(&expense)
            .unwrap()
            .category_limits(&limits)
            .unwrap();
        assert_eq!(batch.len(), 3);
        repo.apply(batch).unwrap();
        assert_eq!(repo.transactions().unwrap().len(), 2);
        assert_eq!(repo.category_limits().unwrap().get("Food"), Some(&300.0));
    }

    #[test]
    fn watch_decodes_collection() {
        let (_store, repo) = repo();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        let _sub = repo
            .watch::<Debt, _>(move |debts| sink.lock().unwrap().push(debts.len()))
            .unwrap();
        repo.save(&Debt::new("A", 1.0, 1.0, 1.0)).unwrap();
        repo.save(&Debt::new("B", 1.0, 1.0, 1.0)).unwrap();
        assert_eq!(*counts.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn delete_all_user_data_removes_subtree() {
        let (store, repo) = repo();
        repo.save(&Debt::new("A", 1.0, 1.0, 1.0)).unwrap();
        repo.set_setting(SettingsKey::VisualMode, Some("dark")).unwrap();
        assert_eq!(
            repo.setting(SettingsKey::VisualMode).unwrap().as_deref(),
            Some("dark")
        );
        repo.delete_all_user_data().unwrap();
        assert!(store
            .get(&StorePath::parse("users/u1").unwrap())
            .unwrap()
            .is_none());
    }
}
