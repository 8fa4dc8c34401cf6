//! SQLite-backed [`VisitStore`].
mod connection;
mod migrations;

use std::path::Path;

use sqlx::SqlitePool;

use super::{CustomerRow, counter_columns, insert_error};
use crate::domain::model::CustomerRecord;
use crate::domain::visit_state::VisitCounters;
use crate::ports::store::{StoreError, VisitStore};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(connection::create_pool(db_path).await?))
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(connection::create_memory_pool().await?))
    }
}

#[async_trait::async_trait]
impl VisitStore for SqliteStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        migrations::migrate(&self.pool).await
    }

    async fn get(&self, phone: &str) -> Result<Option<CustomerRecord>, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT phone, name, monthly_visits, lifetime_visits FROM customers WHERE phone = ?1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CustomerRecord::try_from).transpose()
    }

    async fn insert(
        &self,
        phone: &str,
        name: Option<&str>,
        counters: VisitCounters,
    ) -> Result<(), StoreError> {
        let (monthly, lifetime) = counter_columns(counters)?;
        sqlx::query(
            "INSERT INTO customers (phone, name, monthly_visits, lifetime_visits) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(phone)
        .bind(name)
        .bind(monthly)
        .bind(lifetime)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, phone))?;
        Ok(())
    }

    async fn update(
        &self,
        phone: &str,
        expected: VisitCounters,
        next: VisitCounters,
    ) -> Result<bool, StoreError> {
        let (next_monthly, next_lifetime) = counter_columns(next)?;
        let (expected_monthly, expected_lifetime) = counter_columns(expected)?;
        let result = sqlx::query(
            "UPDATE customers SET monthly_visits = ?1, lifetime_visits = ?2 \
             WHERE phone = ?3 AND monthly_visits = ?4 AND lifetime_visits = ?5",
        )
        .bind(next_monthly)
        .bind(next_lifetime)
        .bind(phone)
        .bind(expected_monthly)
        .bind(expected_lifetime)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
