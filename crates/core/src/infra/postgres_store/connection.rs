//! Helpers to create/configure the
//! Postgres pool.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::ports::store::StoreError;

pub async fn create_pool(url: &str, schema: String) -> Result<PgPool, StoreError> {
    Ok(PgPoolOptions::new()
        .max_connections(10)
        .after_connect(set_search_path(schema))
        .connect(url)
        .await?)
}

#[allow(clippy::type_complexity)]
fn set_search_path(
    schema: String,
) -> impl Fn(
    &mut sqlx::PgConnection,
    sqlx::pool::PoolConnectionMetadata,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<(), sqlx::Error>> + Send + '_>,
> {
    move |conn, _meta| {
        let schema_ident = quote_ident(&schema);

        Box::pin(async move {
            let create_stmt = format!("CREATE SCHEMA IF NOT EXISTS {schema_ident}");
            sqlx::query(&create_stmt).execute(&mut *conn).await?;

            let search_stmt = format!("SET search_path TO {schema_ident}");
            sqlx::query(&search_stmt).execute(&mut *conn).await?;

            Ok(())
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
