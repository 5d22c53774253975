use hashes::{sha256d, Hash};

use crate::crypto::BLSSignature;
use crate::ephemeral::{InstantLock, TransactionLockVote};
use crate::sml::{MasternodeEntry, QuorumEntry};
use crate::test_utils::TestBls;
use crate::types::{BlockHash, OutPoint, Txid};

/// An ISLock over `input_count` distinct inputs, signed by `quorum` under [`TestBls`].
pub fn test_instant_lock(quorum: &QuorumEntry, input_count: usize) -> InstantLock {
    let mut seed = Vec::with_capacity(40);
    seed.extend_from_slice(quorum.quorum_hash.as_byte_array());
    seed.extend_from_slice(&(input_count as u64).to_le_bytes());

    let inputs = (0..input_count)
        .map(|i| {
            let mut preimage = seed.clone();
            preimage.extend_from_slice(&(i as u32).to_le_bytes());
            OutPoint::new(Txid::from_raw_hash(sha256d::Hash::hash(&preimage)), i as u32 % 4)
        })
        .collect();

    let mut lock = InstantLock {
        version: 1,
        inputs,
        txid: Txid::from_raw_hash(sha256d::Hash::hash(&seed)),
        llmq_type: quorum.llmq_type,
        quorum_hash: quorum.quorum_hash,
        signature: BLSSignature::from([0; 96]),
    };
    lock.signature = TestBls::sign(&quorum.quorum_public_key, lock.sign_id().as_byte_array());
    lock
}

/// Builds lock votes signed with a masternode's operator key under [`TestBls`].
pub struct VoteBuilder {
    txid: Txid,
    input: OutPoint,
    modifier: BlockHash,
}

impl VoteBuilder {
    pub fn new(txid: Txid, input: OutPoint, modifier: BlockHash) -> Self {
        Self {
            txid,
            input,
            modifier,
        }
    }

    pub fn signed_by(&self, masternode: &MasternodeEntry) -> TransactionLockVote {
        let collateral = Txid::from_raw_hash(masternode.pro_reg_tx_hash.to_raw_hash());
        let mut vote = TransactionLockVote {
            txid: self.txid,
            outpoint: self.input,
            outpoint_masternode: OutPoint::new(collateral, 1),
            quorum_modifier_hash: self.modifier,
            masternode_pro_tx_hash: masternode.pro_reg_tx_hash,
            signature: BLSSignature::from([0; 96]),
        };
        vote.signature = TestBls::sign(&masternode.operator_public_key, vote.hash().as_byte_array());
        vote
    }
}
