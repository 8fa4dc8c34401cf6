pub mod memory_store;
pub mod postgres_store;
pub mod sqlite_store;

use crate::domain::model::CustomerRecord;
use crate::domain::visit_state::VisitCounters;
use crate::ports::store::StoreError;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    phone: String,
    name: Option<String>,
    monthly_visits: i64,
    lifetime_visits: i64,
}

impl TryFrom<CustomerRow> for CustomerRecord {
    type Error = StoreError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let monthly = u32::try_from(row.monthly_visits).map_err(|_| {
            StoreError::Backend(format!(
                "corrupt monthly_visits {} for {}",
                row.monthly_visits, row.phone
            ))
        })?;
        let lifetime = u64::try_from(row.lifetime_visits).map_err(|_| {
            StoreError::Backend(format!(
                "corrupt lifetime_visits {} for {}",
                row.lifetime_visits, row.phone
            ))
        })?;
        Ok(Self {
            phone: row.phone,
            name: row.name,
            counters: VisitCounters { monthly, lifetime },
        })
    }
}

/// Column values for `counters`; lifetime totals past `i64::MAX` cannot be stored.
fn counter_columns(counters: VisitCounters) -> Result<(i64, i64), StoreError> {
    let lifetime = i64::try_from(counters.lifetime).map_err(|_| {
        StoreError::Backend(format!("lifetime_visits {} out of range", counters.lifetime))
    })?;
    Ok((i64::from(counters.monthly), lifetime))
}

/// SQLSTATE 23505 (postgres) or extended code 2067 (sqlite).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                || db_err.code().as_deref() == Some("2067")
    )
}

fn insert_error(err: sqlx::Error, phone: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate(phone.to_string())
    } else {
        err.into()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(monthly: i64, lifetime: i64) -> CustomerRow {
        CustomerRow {
            phone: "612345678".into(),
            name: None,
            monthly_visits: monthly,
            lifetime_visits: lifetime,
        }
    }

    #[test]
    fn well_formed_row_converts() {
        let record = CustomerRecord::try_from(row(3, 13)).unwrap();
        assert_eq!(
            record.counters,
            VisitCounters {
                monthly: 3,
                lifetime: 13
            }
        );
    }

    #[test]
    fn negative_counters_are_rejected() {
        assert!(matches!(
            CustomerRecord::try_from(row(-1, 5)),
            Err(StoreError::Backend(_))
        ));
        assert!(matches!(
            CustomerRecord::try_from(row(1, -5)),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn oversized_monthly_is_rejected() {
        assert!(CustomerRecord::try_from(row(i64::from(u32::MAX) + 1, 1)).is_err());
    }

    #[test]
    fn lifetime_beyond_i64_cannot_be_bound() {
        let counters = VisitCounters {
            monthly: 1,
            lifetime: u64::MAX,
        };
        assert!(matches!(
            counter_columns(counters),
            Err(StoreError::Backend(_))
        ));
        assert_eq!(
            counter_columns(VisitCounters::first()).unwrap(),
            (1, 1)
        );
    }
}
