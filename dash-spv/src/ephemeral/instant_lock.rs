//! Deterministic-quorum InstantSend lock (`islock`).

use hashes::{sha256d, Hash};

use crate::consensus::{write_compact_size, write_var_bytes, Encodable};
use crate::crypto::BLSSignature;
use crate::sml::llmq_type::LLMQType;
use crate::types::{OutPoint, QuorumHash, Txid};

const IS_LOCK_REQUEST_ID_PREFIX: &str = "islock";

/// An ISLock: one threshold signature by a quorum over the transaction's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantLock {
    pub version: u8,
    pub inputs: Vec<OutPoint>,
    pub txid: Txid,
    /// Quorum the signature is attributed to.
    pub llmq_type: LLMQType,
    pub quorum_hash: QuorumHash,
    pub signature: BLSSignature,
}

impl InstantLock {
    /// `sha256d(compactSize("islock") || "islock" || compactSize(n) || inputs)`.
    pub fn request_id(&self) -> sha256d::Hash {
        let mut writer = Vec::with_capacity(8 + self.inputs.len() * 36);
        write_var_bytes(&mut writer, IS_LOCK_REQUEST_ID_PREFIX.as_bytes());
        write_compact_size(&mut writer, self.inputs.len() as u64);
        for input in &self.inputs {
            input.consensus_encode(&mut writer);
        }
        sha256d::Hash::hash(&writer)
    }

    /// `sha256d(llmqType || quorumHash || requestId || txid)`, the signed digest.
    pub fn sign_id(&self) -> sha256d::Hash {
        let mut writer = Vec::with_capacity(1 + 32 * 3);
        u8::from(self.llmq_type).consensus_encode(&mut writer);
        self.quorum_hash.consensus_encode(&mut writer);
        writer.extend_from_slice(self.request_id().as_byte_array());
        self.txid.consensus_encode(&mut writer);
        sha256d::Hash::hash(&writer)
    }
}
