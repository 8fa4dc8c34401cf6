//! Per-phone async locks serialising read-modify-write cycles inside one process.
use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct PhoneLocks {
    slots: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

pub struct PhoneGuard {
    _slot: OwnedMutexGuard<()>,
}

impl PhoneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, phone: &str) -> PhoneGuard {
        let slot = {
            let mut slots = self.slots.lock().await;
            // Only the map itself references an idle slot.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry(phone.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        PhoneGuard {
            _slot: slot.lock_owned().await,
        }
    }

    pub async fn tracked(&self) -> usize {
        self.slots.lock().await.len()
    }
}
