//! InstantSend finality.

mod manager;
mod progress;
mod state;

pub use manager::{InstantSendPipeline, LockOutcome};
pub use progress::InstantSendProgress;
pub use state::{InstantSendStatus, InstantTransactionState};
