use std::fmt;
use std::time::Instant;

/// Counters for the InstantSend pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSendProgress {
    /// Transactions with locks waiting for their quorum to appear in the masternode list.
    pending: usize,
    /// Number of transactions that reached instant finality.
    finalized: u32,
    /// Number of votes and locks discarded as invalid.
    invalid: u32,
    /// The last time a claim was processed.
    last_activity: Instant,
}

impl Default for InstantSendProgress {
    fn default() -> Self {
        Self {
            pending: 0,
            finalized: 0,
            invalid: 0,
            last_activity: Instant::now(),
        }
    }
}

impl InstantSendProgress {
    /// Transactions with locks waiting for their quorum to appear in the masternode list.
    pub fn pending(&self) -> usize {
        self.pending
    }
    /// Number of transactions that reached instant finality.
    pub fn finalized(&self) -> u32 {
        self.finalized
    }
    /// Number of votes and locks discarded as invalid.
    pub fn invalid(&self) -> u32 {
        self.invalid
    }
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }
    pub(super) fn add_pending(&mut self) {
        self.pending += 1;
        self.bump_last_activity();
    }
    pub(super) fn remove_pending(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.bump_last_activity();
    }
    pub(super) fn add_finalized(&mut self, count: u32) {
        self.finalized += count;
        self.bump_last_activity();
    }
    pub(super) fn add_invalid(&mut self, count: u32) {
        self.invalid += count;
        self.bump_last_activity();
    }
    fn bump_last_activity(&mut self) {
        self.last_activity = Instant::now();
    }
}

impl fmt::Display for InstantSendProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "finalized: {}, invalid: {}, pending: {}, last_activity: {}s",
            self.finalized,
            self.invalid,
            self.pending,
            self.last_activity.elapsed().as_secs()
        )
    }
}
