//! Legacy InstantSend transaction lock vote (`txlvote`).

use hashes::{sha256d, Hash};

use crate::consensus::Encodable;
use crate::crypto::BLSSignature;
use crate::types::{BlockHash, OutPoint, ProTxHash, Txid};

/// A single masternode's vote to lock one input of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLockVote {
    pub txid: Txid,
    /// The input being locked.
    pub outpoint: OutPoint,
    /// Collateral outpoint of the voting masternode.
    pub outpoint_masternode: OutPoint,
    /// Block hash the lock quorum is selected with.
    pub quorum_modifier_hash: BlockHash,
    pub masternode_pro_tx_hash: ProTxHash,
    pub signature: BLSSignature,
}

impl TransactionLockVote {
    /// Digest signed by the voting masternode.
    pub fn hash(&self) -> sha256d::Hash {
        let mut writer = Vec::with_capacity(32 + 36 + 36 + 32 + 32);
        self.txid.consensus_encode(&mut writer);
        self.outpoint.consensus_encode(&mut writer);
        self.outpoint_masternode.consensus_encode(&mut writer);
        self.quorum_modifier_hash.consensus_encode(&mut writer);
        self.masternode_pro_tx_hash.consensus_encode(&mut writer);
        sha256d::Hash::hash(&writer)
    }
}
