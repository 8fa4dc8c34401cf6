use sqlx::SqlitePool;
use tracing::info;

use crate::ports::store::StoreError;

pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
      CREATE TABLE IF NOT EXISTS customers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        phone TEXT UNIQUE NOT NULL,
        monthly_visits INTEGER NOT NULL DEFAULT 0,
        lifetime_visits INTEGER NOT NULL DEFAULT 0,
        name TEXT NULL
      )"#,
    )
    .execute(pool)
    .await?;
    info!("customers table ready (sqlite)");
    Ok(())
}
