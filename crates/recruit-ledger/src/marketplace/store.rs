use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{CandidateStage, VacancyId};

/// Implemented by anything the registry keeps in a pool. Record ids are the
/// uniqueness key within a pool.
pub trait PoolRecord {
    fn record_id(&self) -> &str;
}

/// Addresses one durable collection. Candidate pools are keyed by stage and
/// vacancy so an id can only ever live in one stage at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolKey {
    Vacancies(String),
    Candidates(CandidateStage, VacancyId),
}

impl PoolKey {
    pub fn vacancies(pool_name: &str) -> Self {
        Self::Vacancies(pool_name.to_string())
    }

    pub fn open(vacancy_id: &VacancyId) -> Self {
        Self::Candidates(CandidateStage::Open, vacancy_id.clone())
    }

    pub fn hired(vacancy_id: &VacancyId) -> Self {
        Self::Candidates(CandidateStage::Hired, vacancy_id.clone())
    }

    /// Flat key under which the pool is persisted.
    pub fn storage_key(&self) -> String {
        match self {
            PoolKey::Vacancies(pool_name) => pool_name.clone(),
            PoolKey::Candidates(stage, vacancy_id) => {
                format!("{}:{}", stage.storage_prefix(), vacancy_id)
            }
        }
    }
}

/// Ordered collection with an id index. Insertion order is preserved until a
/// removal, which swaps the last entry into the vacated slot.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: PoolRecord> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|slot| &self.entries[*slot])
    }

    /// Appends a record, rejecting a second record with the same id.
    pub fn append(&mut self, item: T) -> Result<(), StoreError> {
        let id = item.record_id().to_string();
        if self.index.contains_key(&id) {
            return Err(StoreError::DuplicateRecord(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(item);
        Ok(())
    }

    /// Removes the record with the given id by overwriting its slot with the
    /// last entry and truncating. Reorders the pool.
    pub fn swap_remove(&mut self, id: &str) -> Option<T> {
        let slot = self.index.remove(id)?;
        let removed = self.entries.swap_remove(slot);
        if slot < self.entries.len() {
            let moved_id = self.entries[slot].record_id().to_string();
            self.index.insert(moved_id, slot);
        }
        Some(removed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record '{0}' already exists in the pool")]
    DuplicateRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable keyed store port. The host ledger provides the real thing; tests
/// and the API service run against the in-memory implementation. All
/// mutations go through `update`, which must hold the store's write lock for
/// the whole closure so concurrent writers to one key serialize instead of
/// overwriting each other's loads.
pub trait PoolStore<T>: Send + Sync {
    fn load(&self, key: &PoolKey) -> Result<Option<Pool<T>>, StoreError>;
    fn contains(&self, key: &PoolKey) -> Result<bool, StoreError>;

    /// Runs `mutate` on the slot for `key` under the store's write lock. The
    /// slot is `None` for a pool that was never created; the closure may fill
    /// it in, and whatever it leaves behind is what gets persisted.
    fn update(
        &self,
        key: &PoolKey,
        mutate: &mut dyn FnMut(&mut Option<Pool<T>>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPoolStore<T> {
    pools: Arc<Mutex<HashMap<String, Pool<T>>>>,
}

impl<T> InMemoryPoolStore<T> {
    pub fn new() -> Self {
        Self {
            pools: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Clone + Send> PoolStore<T> for InMemoryPoolStore<T> {
    fn load(&self, key: &PoolKey) -> Result<Option<Pool<T>>, StoreError> {
        let guard = self.pools.lock().expect("pool store mutex poisoned");
        Ok(guard.get(&key.storage_key()).cloned())
    }

    fn contains(&self, key: &PoolKey) -> Result<bool, StoreError> {
        let guard = self.pools.lock().expect("pool store mutex poisoned");
        Ok(guard.contains_key(&key.storage_key()))
    }

    fn update(
        &self,
        key: &PoolKey,
        mutate: &mut dyn FnMut(&mut Option<Pool<T>>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut guard = self.pools.lock().expect("pool store mutex poisoned");
        let storage_key = key.storage_key();
        let mut slot = guard.remove(&storage_key);
        let result = mutate(&mut slot);
        if let Some(pool) = slot {
            guard.insert(storage_key, pool);
        }
        result
    }
}

/// Keyed, ordered collection abstraction over the durable store. Mutations
/// run inside the store's lock via `PoolStore::update`, so two writers to
/// the same pool key serialize rather than losing one another's records.
pub struct PoolRegistry<T, S> {
    store: S,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, S> PoolRegistry<T, S>
where
    T: PoolRecord + Clone,
    S: PoolStore<T>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the pool under `key`, persisting a fresh empty one on first
    /// touch.
    pub fn get_or_create(&self, key: &PoolKey) -> Result<Pool<T>, StoreError> {
        let mut snapshot = Pool::new();
        self.store.update(key, &mut |slot| {
            snapshot = slot.get_or_insert_with(Pool::new).clone();
            Ok(())
        })?;
        Ok(snapshot)
    }

    pub fn load(&self, key: &PoolKey) -> Result<Option<Pool<T>>, StoreError> {
        self.store.load(key)
    }

    pub fn contains_pool(&self, key: &PoolKey) -> Result<bool, StoreError> {
        self.store.contains(key)
    }

    /// Appends under the store's lock, creating the pool on first use.
    pub fn append(&self, key: &PoolKey, item: T) -> Result<(), StoreError> {
        let mut item = Some(item);
        self.store.update(key, &mut |slot| {
            let pool = slot.get_or_insert_with(Pool::new);
            match item.take() {
                Some(record) => pool.append(record),
                None => Ok(()),
            }
        })
    }

    /// Full linear scan in stable pool order. An absent pool scans as empty.
    pub fn scan<P>(&self, key: &PoolKey, predicate: P) -> Result<Vec<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let Some(pool) = self.store.load(key)? else {
            return Ok(Vec::new());
        };
        Ok(pool
            .entries()
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect())
    }

    pub fn find_by_id(&self, key: &PoolKey, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self
            .store
            .load(key)?
            .and_then(|pool| pool.find(id).cloned()))
    }

    /// Removes one record by id using the swap-with-last strategy, all under
    /// the store's lock. A miss or an absent pool is a no-op returning
    /// `Ok(None)`.
    pub fn remove_by_id(&self, key: &PoolKey, id: &str) -> Result<Option<T>, StoreError> {
        let mut removed = None;
        self.store.update(key, &mut |slot| {
            if let Some(pool) = slot.as_mut() {
                removed = pool.swap_remove(id);
            }
            Ok(())
        })?;
        Ok(removed)
    }
}
