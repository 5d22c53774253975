//! Coinbase special transaction (DIP-0004) carrying the list commitments.

use hashes::{sha256d, Hash};

use crate::consensus::{write_compact_size, write_var_bytes, Encodable};
use crate::crypto::BLSSignature;
use crate::types::{MerkleRootMasternodeList, MerkleRootQuorums, Txid};

/// Special transaction type of a coinbase.
pub const COINBASE_TX_TYPE: u16 = 5;

/// Payload version that adds the quorum merkle root.
pub const PAYLOAD_VERSION_QUORUM_ROOT: u16 = 2;

/// Payload version that adds the best ChainLock and the credit pool balance.
pub const PAYLOAD_VERSION_CHAIN_LOCK: u16 = 3;

/// ChainLock fields of a version 3 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseChainLock {
    pub best_cl_height_diff: u32,
    pub best_cl_signature: BLSSignature,
    pub credit_pool_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbasePayload {
    pub version: u16,
    pub height: u32,
    pub merkle_root_masternode_list: MerkleRootMasternodeList,
    /// Only serialized from version 2 on.
    pub merkle_root_quorums: MerkleRootQuorums,
    /// Only serialized from version 3 on.
    pub chain_lock: Option<CoinbaseChainLock>,
}

impl Encodable for CoinbasePayload {
    fn consensus_encode(&self, writer: &mut Vec<u8>) {
        self.version.consensus_encode(writer);
        self.height.consensus_encode(writer);
        self.merkle_root_masternode_list.consensus_encode(writer);
        if self.version >= PAYLOAD_VERSION_QUORUM_ROOT {
            self.merkle_root_quorums.consensus_encode(writer);
        }
        if self.version >= PAYLOAD_VERSION_CHAIN_LOCK {
            if let Some(chain_lock) = &self.chain_lock {
                write_compact_size(writer, chain_lock.best_cl_height_diff as u64);
                writer.extend_from_slice(chain_lock.best_cl_signature.as_bytes());
                chain_lock.credit_pool_balance.consensus_encode(writer);
            }
        }
    }
}

impl CoinbasePayload {
    pub fn has_quorum_root(&self) -> bool {
        self.version >= PAYLOAD_VERSION_QUORUM_ROOT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

/// The coinbase transaction of the block a masternode list diff targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransaction {
    pub version: u16,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub payload: CoinbasePayload,
}

impl Encodable for CoinbaseTransaction {
    fn consensus_encode(&self, writer: &mut Vec<u8>) {
        // Special transactions pack the type into the upper 16 bits of the version.
        (self.version as u32 | ((COINBASE_TX_TYPE as u32) << 16)).consensus_encode(writer);

        write_compact_size(writer, 1);
        writer.extend_from_slice(&[0u8; 32]);
        u32::MAX.consensus_encode(writer);
        write_var_bytes(writer, &self.script_sig);
        self.sequence.consensus_encode(writer);

        write_compact_size(writer, self.outputs.len() as u64);
        for output in &self.outputs {
            output.value.consensus_encode(writer);
            write_var_bytes(writer, &output.script_pubkey);
        }

        self.lock_time.consensus_encode(writer);
        write_var_bytes(writer, &self.payload.serialize());
    }
}

impl CoinbaseTransaction {
    pub fn txid(&self) -> Txid {
        Txid::from_raw_hash(sha256d::Hash::hash(&self.serialize()))
    }
}
