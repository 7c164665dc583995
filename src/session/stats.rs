use serde::{Deserialize, Serialize};

use crate::replies::StatsCredit;

/// Running usage counters. Only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Total replies generated.
    #[serde(rename = "responses")]
    pub total_responses: u64,
    /// Total minutes saved.
    #[serde(rename = "timeSaved")]
    pub time_saved_minutes: u64,
}

impl UsageStats {
    /// Add a generation's credit.
    pub fn apply(&mut self, credit: StatsCredit) {
        self.total_responses = self.total_responses.saturating_add(credit.responses);
        self.time_saved_minutes = self.time_saved_minutes.saturating_add(credit.minutes);
    }
}
