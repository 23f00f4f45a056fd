use std::time::Duration;

use crate::types::constants::{DEFAULT_BASE_DELAY_MS, DEFAULT_CAP_DELAY_MS};

/// Pure exponential backoff with a ceiling: `min(base * 2^attempt, cap)`.
///
/// No jitter is applied, matching the reference configuration; correlated
/// reconnection across many clients is an accepted risk at this scale.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Delay before retry `attempt` (0-indexed). Saturates at the cap for
    /// any attempt large enough to overflow the doubling.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = match 1u32.checked_shl(attempt) {
            Some(factor) => factor,
            None => return self.cap,
        };
        self.base.checked_mul(factor).map_or(self.cap, |delay| delay.min(self.cap))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            Duration::from_millis(DEFAULT_CAP_DELAY_MS),
        )
    }
}
