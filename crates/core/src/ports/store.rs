//! Persistence port for customer records.
use thiserror::Error;

use crate::domain::model::CustomerRecord;
use crate::domain::visit_state::VisitCounters;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("customer {0} already exists")]
    Duplicate(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait VisitStore: Send + Sync {
    /// Create the customers table if it is missing.
    async fn migrate(&self) -> Result<(), StoreError>;

    async fn get(&self, phone: &str) -> Result<Option<CustomerRecord>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when `phone` already exists.
    async fn insert(
        &self,
        phone: &str,
        name: Option<&str>,
        counters: VisitCounters,
    ) -> Result<(), StoreError>;

    /// Writes `next` only if the stored counters still equal `expected`.
    /// Returns `false` when another writer got there first.
    async fn update(
        &self,
        phone: &str,
        expected: VisitCounters,
        next: VisitCounters,
    ) -> Result<bool, StoreError>;
}
