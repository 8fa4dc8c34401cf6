//! In-process store for tests and the `memory` dialect.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::model::CustomerRecord;
use crate::domain::visit_state::VisitCounters;
use crate::ports::store::{StoreError, VisitStore};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, CustomerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<String, CustomerRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".into()))
    }
}

#[async_trait::async_trait]
impl VisitStore for MemoryStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, phone: &str) -> Result<Option<CustomerRecord>, StoreError> {
        Ok(self.records()?.get(phone).cloned())
    }

    async fn insert(
        &self,
        phone: &str,
        name: Option<&str>,
        counters: VisitCounters,
    ) -> Result<(), StoreError> {
        let mut records = self.records()?;
        if records.contains_key(phone) {
            return Err(StoreError::Duplicate(phone.to_string()));
        }
        records.insert(
            phone.to_string(),
            CustomerRecord {
                phone: phone.to_string(),
                name: name.map(str::to_string),
                counters,
            },
        );
        Ok(())
    }

    async fn update(
        &self,
        phone: &str,
        expected: VisitCounters,
        next: VisitCounters,
    ) -> Result<bool, StoreError> {
        let mut records = self.records()?;
        match records.get_mut(phone) {
            Some(record) if record.counters == expected => {
                record.counters = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
