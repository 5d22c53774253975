//! Simplified masternode list (DIP-0004) data: entries, quorum commitments,
//! diffs and immutable snapshots.

pub mod coinbase;
pub mod diff;
pub mod llmq_type;
pub mod masternode_entry;
pub mod quorum_entry;
pub mod snapshot;

pub use coinbase::{CoinbasePayload, CoinbaseTransaction, TxOut};
pub use diff::MasternodeListDiff;
pub use llmq_type::LLMQType;
pub use masternode_entry::MasternodeEntry;
pub use quorum_entry::{QuorumEntry, QuorumKey};
pub use snapshot::ListSnapshot;
