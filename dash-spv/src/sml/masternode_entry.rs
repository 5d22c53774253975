use std::net::SocketAddrV4;

use hashes::{sha256, sha256d, Hash};
use primitive_types::U256;

use crate::consensus::Encodable;
use crate::crypto::BLSPublicKey;
use crate::types::{BlockHash, ProTxHash, PubkeyHash};

/// A simplified masternode list entry.
///
/// `confirmed_hash` is all zeros until the registration is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasternodeEntry {
    pub pro_reg_tx_hash: ProTxHash,
    pub confirmed_hash: BlockHash,
    pub service_address: SocketAddrV4,
    pub operator_public_key: BLSPublicKey,
    pub key_id_voting: PubkeyHash,
    pub is_valid: bool,
}

impl Encodable for MasternodeEntry {
    fn consensus_encode(&self, writer: &mut Vec<u8>) {
        self.pro_reg_tx_hash.consensus_encode(writer);
        self.confirmed_hash.consensus_encode(writer);
        // Addresses are serialized IPv6-mapped, port in network byte order.
        writer.extend_from_slice(&self.service_address.ip().to_ipv6_mapped().octets());
        writer.extend_from_slice(&self.service_address.port().to_be_bytes());
        writer.extend_from_slice(self.operator_public_key.as_bytes());
        self.key_id_voting.consensus_encode(writer);
        (self.is_valid as u8).consensus_encode(writer);
    }
}

impl MasternodeEntry {
    /// Leaf hash of this entry in the masternode list merkle tree.
    pub fn entry_hash(&self) -> sha256d::Hash {
        sha256d::Hash::hash(&self.serialize())
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_hash != BlockHash::all_zeros()
    }

    /// `sha256(proRegTxHash || confirmedHash)`, the per-masternode input to quorum scores.
    pub fn confirmed_hash_hashed_with_pro_reg_tx(&self) -> sha256::Hash {
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(self.pro_reg_tx_hash.as_byte_array());
        buffer[32..].copy_from_slice(self.confirmed_hash.as_byte_array());
        sha256::Hash::hash(&buffer)
    }

    /// Score of this masternode for `modifier`, `None` when it may not be selected.
    pub fn score(&self, modifier: &BlockHash) -> Option<U256> {
        if !self.is_valid || !self.is_confirmed() {
            return None;
        }
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(self.confirmed_hash_hashed_with_pro_reg_tx().as_byte_array());
        buffer[32..].copy_from_slice(modifier.as_byte_array());
        Some(U256::from_little_endian(sha256::Hash::hash(&buffer).as_byte_array()))
    }
}
