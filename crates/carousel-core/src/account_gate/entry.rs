//! Per-account observations.

use std::time::Instant;

/// Outcome counters for one account, updated when a saga finishes.
#[derive(Debug, Clone, Default)]
pub struct AccountStats {
    pub throttled_events: u32,
    pub last_throttled_at: Option<Instant>,
    pub error_events: u32,
    pub last_error_at: Option<Instant>,
    pub success_events: u32,
    pub last_success_at: Option<Instant>,
}

impl AccountStats {
    /// Most recent recorded outcome of any kind.
    pub fn last_activity(&self) -> Option<Instant> {
        [
            self.last_throttled_at,
            self.last_error_at,
            self.last_success_at,
        ]
        .into_iter()
        .flatten()
        .max()
    }

    pub(super) fn throttled(&mut self) {
        self.throttled_events = self.throttled_events.saturating_add(1);
        self.last_throttled_at = Some(Instant::now());
    }

    pub(super) fn error(&mut self) {
        self.error_events = self.error_events.saturating_add(1);
        self.last_error_at = Some(Instant::now());
    }

    pub(super) fn success(&mut self) {
        self.success_events = self.success_events.saturating_add(1);
        self.last_success_at = Some(Instant::now());
    }
}
