//! In-memory taxpayer store.
//!
//! # Invariants
//! - Presence check and insert happen under one write guard.
//! - `list_all` is ordered by `tid` ascending.

use crate::model::taxpayer::{TaxpayerRecord, Tid};
use crate::repo::taxpayer_repo::{RepoError, RepoResult, TaxpayerStore};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-lifetime store backed by a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryTaxpayerStore {
    records: RwLock<HashMap<Tid, TaxpayerRecord>>,
}

impl InMemoryTaxpayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The only mutation is a single `HashMap::insert` of a complete record,
    // so a poisoned guard still protects a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Tid, TaxpayerRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Tid, TaxpayerRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaxpayerStore for InMemoryTaxpayerStore {
    fn insert(&self, record: &TaxpayerRecord) -> RepoResult<()> {
        match self.write().entry(record.tid.clone()) {
            Entry::Occupied(_) => Err(RepoError::DuplicateKey(record.tid.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn get(&self, tid: &str) -> RepoResult<Option<TaxpayerRecord>> {
        Ok(self.read().get(tid).cloned())
    }

    fn list_all(&self) -> RepoResult<Vec<TaxpayerRecord>> {
        let mut records: Vec<TaxpayerRecord> = self.read().values().cloned().collect();
        records.sort_by(|a, b| a.tid.cmp(&b.tid));
        Ok(records)
    }
}
