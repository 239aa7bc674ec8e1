use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known upstream request budget.
///
/// `remaining` is copied verbatim from the upstream's remaining-requests
/// header and is never decremented locally.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub remaining: u32,
    pub last_request_time_utc: DateTime<Utc>,
}

impl Quota {
    pub fn new(remaining: u32, last_request_time_utc: DateTime<Utc>) -> Self {
        Self {
            remaining,
            last_request_time_utc,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining < 1
    }
}
