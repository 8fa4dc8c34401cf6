//! Customer records and the ledger policy that selects which service variant is active.
use serde::Deserialize;

use crate::domain::visit_state::VisitCounters;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub phone: String,
    pub name: Option<String>,
    pub counters: VisitCounters,
}

/// Knobs that cover the differences between the historical service variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Reject phones that are not exactly `phone_digits` ASCII digits.
    pub validate_phone: bool,
    pub phone_digits: usize,
    /// Monthly counter wraps to 0 when it would reach this value.
    pub cycle_length: u32,
    /// When false, names are neither stored nor checked against the lock.
    pub track_name: bool,
    /// Whether lookups report the lifetime counter.
    pub expose_lifetime: bool,
    /// Compare-and-set attempts before a registration gives up as contended.
    pub max_attempts: u32,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            validate_phone: true,
            phone_digits: 9,
            cycle_length: 10,
            track_name: true,
            expose_lifetime: true,
            max_attempts: 8,
        }
    }
}

impl LedgerPolicy {
    pub fn phone_is_valid(&self, phone: &str) -> bool {
        if !self.validate_phone {
            return !phone.is_empty();
        }
        phone.len() == self.phone_digits && phone.bytes().all(|b| b.is_ascii_digit())
    }

    /// Trimmed, non-empty name, or `None` when names are not tracked.
    pub fn normalize_name(&self, name: Option<&str>) -> Option<String> {
        if !self.track_name {
            return None;
        }
        name.map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}
