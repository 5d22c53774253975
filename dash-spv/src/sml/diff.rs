use crate::merkle::PartialMerkleTree;
use crate::sml::coinbase::CoinbaseTransaction;
use crate::sml::masternode_entry::MasternodeEntry;
use crate::sml::quorum_entry::{QuorumEntry, QuorumKey};
use crate::types::{BlockHash, MerkleRootMasternodeList, MerkleRootQuorums, ProTxHash};

/// A decoded `mnlistdiff` message.
///
/// Moves the list from `base_block_hash` to `block_hash`. The claimed roots are
/// checked against the recomputed lists and against the coinbase of
/// `block_hash`, proven by `coinbase_merkle_proof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasternodeListDiff {
    pub base_block_hash: BlockHash,
    pub block_hash: BlockHash,
    pub deleted_masternodes: Vec<ProTxHash>,
    pub added_masternodes: Vec<MasternodeEntry>,
    pub deleted_quorums: Vec<QuorumKey>,
    pub added_quorums: Vec<QuorumEntry>,
    pub merkle_root_mn_list: MerkleRootMasternodeList,
    pub merkle_root_quorum_list: MerkleRootQuorums,
    pub coinbase_transaction: CoinbaseTransaction,
    pub coinbase_merkle_proof: PartialMerkleTree,
}
