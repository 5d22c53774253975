//! Masternode and quorum list maintenance.

mod manager;
mod progress;

pub use manager::{ListReader, MasternodeListManager};
pub use progress::MasternodesProgress;
