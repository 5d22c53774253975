use std::fmt;
use std::time::Instant;

/// Progress of masternode list diff application.
#[derive(Debug, Clone, PartialEq)]
pub struct MasternodesProgress {
    /// The height of the live masternode list.
    current_height: u32,
    /// Number of mnlistdiffs applied since the manager was created.
    diffs_processed: u32,
    /// Number of mnlistdiffs rejected since the manager was created.
    diffs_rejected: u32,
    /// The last time a mnlistdiff was applied or rejected.
    last_activity: Instant,
}

impl MasternodesProgress {
    pub fn new(current_height: u32) -> Self {
        Self {
            current_height,
            diffs_processed: 0,
            diffs_rejected: 0,
            last_activity: Instant::now(),
        }
    }

    pub fn current_height(&self) -> u32 {
        self.current_height
    }

    pub fn diffs_processed(&self) -> u32 {
        self.diffs_processed
    }

    pub fn diffs_rejected(&self) -> u32 {
        self.diffs_rejected
    }

    /// The last time a mnlistdiff was applied or rejected.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub(super) fn record_applied(&mut self, height: u32) {
        self.current_height = height;
        self.diffs_processed += 1;
        self.bump_last_activity();
    }

    pub(super) fn record_rejected(&mut self) {
        self.diffs_rejected += 1;
        self.bump_last_activity();
    }

    fn bump_last_activity(&mut self) {
        self.last_activity = Instant::now();
    }
}

impl fmt::Display for MasternodesProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "height: {}, applied: {}, rejected: {}, last_activity: {}s",
            self.current_height,
            self.diffs_processed,
            self.diffs_rejected,
            self.last_activity.elapsed().as_secs()
        )
    }
}
