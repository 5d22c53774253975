//! Stateful components fed by network messages: the masternode list manager
//! and the InstantSend finality pipeline.

pub mod instantsend;
pub mod masternodes;

pub use instantsend::{InstantSendPipeline, InstantSendProgress, InstantSendStatus, InstantTransactionState, LockOutcome};
pub use masternodes::{ListReader, MasternodeListManager, MasternodesProgress};
