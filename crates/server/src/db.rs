use std::path::Path;
use std::sync::Arc;

use visit_ledger_core::infra::memory_store::MemoryStore;
use visit_ledger_core::infra::postgres_store::PostgresStore;
use visit_ledger_core::infra::sqlite_store::SqliteStore;
use visit_ledger_core::ports::store::VisitStore;

use crate::config::{
  ConfigError,
  ServerConfig,
  StoreDialect,
  validate_schema_name
};

pub async fn connect_store(
  config: &ServerConfig,
  config_path: &Path
) -> Result<Arc<dyn VisitStore>, ConfigError> {
  let store: Arc<dyn VisitStore> =
    match config.dialect()? {
      | StoreDialect::Sqlite => {
        let base_dir = config_path
          .parent()
          .ok_or_else(|| {
            ConfigError::Invalid(
              "config path has no parent"
                .into()
            )
          })?;

        let path =
          config.sqlite_path(base_dir);

        tracing::info!(
          path = %path.display(),
          "opening sqlite store"
        );

        let store =
          SqliteStore::open(&path)
            .await
            .map_err(|e| {
              ConfigError::Invalid(
                format!(
                  "sqlite connect \
                   failed: {e}"
                )
              )
            })?;

        Arc::new(store)
      }
      | StoreDialect::Postgres => {
        let pg = config
          .postgres
          .as_ref()
          .ok_or_else(|| {
            ConfigError::Invalid(
              "postgres section missing"
                .into()
            )
          })?;

        let schema =
          validate_schema_name(
            &pg.schema
          )?;

        let url = format!(
          "postgres://{}:{}@{}:{}/{}?\
           sslmode={}",
          pg.user,
          pg.password,
          pg.host,
          pg.port,
          pg.database,
          pg.ssl_mode
        );

        tracing::info!(
          host = %pg.host,
          database = %pg.database,
          schema = %schema,
          "opening postgres store"
        );

        let store =
          PostgresStore::connect(
            &url, schema
          )
          .await
          .map_err(|e| {
            ConfigError::Invalid(format!(
              "postgres connect failed: \
               {e}"
            ))
          })?;

        Arc::new(store)
      }
      | StoreDialect::Memory => {
        tracing::warn!(
          "memory store selected, \
           visits are lost on restart"
        );

        Arc::new(MemoryStore::new())
      }
    };

  store.migrate().await.map_err(|e| {
    ConfigError::Invalid(format!(
      "schema apply error: {e}"
    ))
  })?;

  Ok(store)
}
