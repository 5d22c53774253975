//! Short-lived InstantSend messages: ISLocks and legacy lock votes.

pub mod instant_lock;
pub mod lock_vote;

pub use instant_lock::InstantLock;
pub use lock_vote::TransactionLockVote;
