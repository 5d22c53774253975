//! Fixtures shared by unit and integration tests.

mod bls;
mod chain;
mod instantsend;
mod masternodes;
mod network;

pub use bls::TestBls;
pub use chain::HeaderChainBuilder;
pub use instantsend::{test_instant_lock, VoteBuilder};
pub use masternodes::{
    masternode_snapshot, quorum_snapshot, test_masternode, test_quorum, BuiltDiff, DiffBuilder,
};
pub use network::MockHostResolver;
