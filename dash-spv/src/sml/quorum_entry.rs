use std::fmt;

use hashes::{sha256d, Hash};

use crate::consensus::{write_bitset, Encodable};
use crate::crypto::{BLSPublicKey, BLSSignature};
use crate::sml::llmq_type::LLMQType;
use crate::types::{QuorumHash, QuorumVVecHash};

/// Identity of a quorum. Ordered by type first, then hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuorumKey {
    pub llmq_type: LLMQType,
    pub quorum_hash: QuorumHash,
}

impl QuorumKey {
    pub fn new(llmq_type: LLMQType, quorum_hash: QuorumHash) -> Self {
        Self {
            llmq_type,
            quorum_hash,
        }
    }
}

impl fmt::Display for QuorumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.llmq_type, self.quorum_hash)
    }
}

/// A final quorum commitment as carried in a masternode list diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumEntry {
    pub version: u16,
    pub llmq_type: LLMQType,
    pub quorum_hash: QuorumHash,
    /// Present for rotated (indexed) quorum versions.
    pub quorum_index: Option<i16>,
    pub signers: Vec<bool>,
    pub valid_members: Vec<bool>,
    pub quorum_public_key: BLSPublicKey,
    pub quorum_vvec_hash: QuorumVVecHash,
    pub threshold_signature: BLSSignature,
    pub all_commitment_aggregated_signature: BLSSignature,
}

impl Encodable for QuorumEntry {
    fn consensus_encode(&self, writer: &mut Vec<u8>) {
        self.version.consensus_encode(writer);
        u8::from(self.llmq_type).consensus_encode(writer);
        self.quorum_hash.consensus_encode(writer);
        if let Some(index) = self.quorum_index {
            index.consensus_encode(writer);
        }
        write_bitset(writer, &self.signers);
        write_bitset(writer, &self.valid_members);
        writer.extend_from_slice(self.quorum_public_key.as_bytes());
        self.quorum_vvec_hash.consensus_encode(writer);
        writer.extend_from_slice(self.threshold_signature.as_bytes());
        writer.extend_from_slice(self.all_commitment_aggregated_signature.as_bytes());
    }
}

impl QuorumEntry {
    pub fn key(&self) -> QuorumKey {
        QuorumKey::new(self.llmq_type, self.quorum_hash)
    }

    /// Leaf hash of this commitment in the quorum list merkle tree.
    pub fn entry_hash(&self) -> sha256d::Hash {
        sha256d::Hash::hash(&self.serialize())
    }

    pub fn valid_member_count(&self) -> usize {
        self.valid_members.iter().filter(|valid| **valid).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quorum(index: Option<i16>) -> QuorumEntry {
        QuorumEntry {
            version: if index.is_some() { 2 } else { 1 },
            llmq_type: LLMQType::Llmqtype50_60,
            quorum_hash: QuorumHash::from_byte_array([5; 32]),
            quorum_index: index,
            signers: vec![true; 10],
            valid_members: vec![true, false, true],
            quorum_public_key: BLSPublicKey::from([1; 48]),
            quorum_vvec_hash: QuorumVVecHash::from_byte_array([2; 32]),
            threshold_signature: BLSSignature::from([3; 96]),
            all_commitment_aggregated_signature: BLSSignature::from([4; 96]),
        }
    }

    #[test]
    fn test_commitment_layout() {
        let bytes = quorum(None).serialize();
        // version, type, hash, 2 bitsets, key, vvec, 2 signatures
        assert_eq!(bytes.len(), 2 + 1 + 32 + (1 + 2) + (1 + 1) + 48 + 32 + 96 + 96);
        assert_eq!(&bytes[..3], &[1, 0, 1]);
        assert_eq!(quorum(Some(3)).serialize().len(), bytes.len() + 2);
    }

    #[test]
    fn test_key_ordering_is_type_then_hash() {
        let a = QuorumKey::new(LLMQType::Llmqtype50_60, QuorumHash::from_byte_array([9; 32]));
        let b = QuorumKey::new(LLMQType::Llmqtype400_60, QuorumHash::from_byte_array([1; 32]));
        assert!(a < b);
        assert_eq!(quorum(None).valid_member_count(), 2);
    }
}
