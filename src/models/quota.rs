use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a check-and-consume against a user's daily bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub day: NaiveDate,
    /// False when the counter was down and the fail-open policy let the request through.
    pub charged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub daily_limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub resets_at: DateTime<Utc>,
}
