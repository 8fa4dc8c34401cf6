//! Visit ledger: the only component that reads or mutates customer records.
//!
//! Registrations are serialised per phone with [`PhoneLocks`] and written through the
//! store's compare-and-set `update`, so neither concurrent requests in this process nor
//! other processes sharing the database can lose a visit.
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::locks::PhoneLocks;
use crate::domain::model::{CustomerRecord, LedgerPolicy};
use crate::domain::visit_state::{RegisterOutcome, VisitCounters};
use crate::ports::store::{StoreError, VisitStore};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid phone number '{0}'")]
    InvalidPhoneFormat(String),
    #[error("the name cannot be changed after the first visit")]
    NameLocked,
    #[error("no customer registered with phone {0}")]
    RecordNotFound(String),
    #[error("gave up on {phone} after {attempts} conflicting writes")]
    Contended { phone: String, attempts: u32 },
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

pub struct VisitLedger {
    store: Arc<dyn VisitStore>,
    policy: LedgerPolicy,
    locks: PhoneLocks,
}

impl VisitLedger {
    pub fn new(store: Arc<dyn VisitStore>, policy: LedgerPolicy) -> Self {
        Self {
            store,
            policy,
            locks: PhoneLocks::new(),
        }
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    pub async fn lookup(&self, phone: &str) -> Result<Option<CustomerRecord>, LedgerError> {
        self.check_phone(phone)?;
        Ok(self.store.get(phone).await?)
    }

    pub async fn find(&self, phone: &str) -> Result<CustomerRecord, LedgerError> {
        self.lookup(phone)
            .await?
            .ok_or_else(|| LedgerError::RecordNotFound(phone.to_string()))
    }

    pub async fn register_visit(
        &self,
        phone: &str,
        name: Option<&str>,
    ) -> Result<RegisterOutcome, LedgerError> {
        self.check_phone(phone)?;
        let name = self.policy.normalize_name(name);

        let _guard = self.locks.acquire(phone).await;

        for attempt in 1..=self.policy.max_attempts {
            let current = self.store.get(phone).await?;

            let Some(record) = current else {
                match self.store.insert(phone, name.as_deref(), VisitCounters::first()).await {
                    Ok(()) => {
                        info!(phone, named = name.is_some(), "first visit registered");
                        return Ok(RegisterOutcome::FirstVisit {
                            counters: VisitCounters::first(),
                        });
                    }
                    Err(StoreError::Duplicate(_)) => {
                        debug!(phone, attempt, "customer created concurrently, retrying");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            if record.counters.monthly > 0 && name.is_some() {
                return Err(LedgerError::NameLocked);
            }

            let next = record.counters.advance(self.policy.cycle_length);
            if self.store.update(phone, record.counters, next).await? {
                info!(
                    phone,
                    monthly = next.monthly,
                    lifetime = next.lifetime,
                    reward = next.is_reward(),
                    "visit registered"
                );
                return Ok(RegisterOutcome::after_update(next));
            }
            debug!(phone, attempt, "counters changed underneath us, retrying");
        }

        warn!(phone, attempts = self.policy.max_attempts, "registration contended");
        Err(LedgerError::Contended {
            phone: phone.to_string(),
            attempts: self.policy.max_attempts,
        })
    }

    fn check_phone(&self, phone: &str) -> Result<(), LedgerError> {
        if self.policy.phone_is_valid(phone) {
            Ok(())
        } else {
            Err(LedgerError::InvalidPhoneFormat(phone.to_string()))
        }
    }
}
