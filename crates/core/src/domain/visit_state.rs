//! Monthly/lifetime visit counters and the transition applied on every registration.
//! The monthly counter cycles 1, 2, .., cycle-1, 0, 1, ..; reaching 0 marks a reward.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitCounters {
    pub monthly: u32,
    pub lifetime: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    FirstVisit { counters: VisitCounters },
    Progress { counters: VisitCounters },
    Reward { counters: VisitCounters },
}

impl VisitCounters {
    /// Counters of a record created by its first registration.
    pub fn first() -> Self {
        Self {
            monthly: 1,
            lifetime: 1,
        }
    }

    pub fn advance(self, cycle_length: u32) -> Self {
        let mut monthly = self.monthly.saturating_add(1);
        if monthly >= cycle_length {
            monthly = 0;
        }
        Self {
            monthly,
            lifetime: self.lifetime.saturating_add(1),
        }
    }

    pub fn is_reward(&self) -> bool {
        self.monthly == 0
    }
}

impl RegisterOutcome {
    pub fn after_update(counters: VisitCounters) -> Self {
        if counters.is_reward() {
            Self::Reward { counters }
        } else {
            Self::Progress { counters }
        }
    }

    pub fn counters(&self) -> VisitCounters {
        match self {
            Self::FirstVisit { counters }
            | Self::Progress { counters }
            | Self::Reward { counters } => *counters,
        }
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, Self::Reward { .. })
    }

    pub fn message(&self, cycle_length: u32) -> String {
        match self {
            Self::FirstVisit { .. } => "First visit registered.".to_string(),
            Self::Reward { .. } => format!(
                "Congratulations! You have reached {cycle_length} visits. Your next visit is on us."
            ),
            Self::Progress { counters } => format!(
                "You have {} visits this month. Total accumulated visits: {}.",
                counters.monthly, counters.lifetime
            ),
        }
    }
}
