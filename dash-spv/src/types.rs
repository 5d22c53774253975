//! Common type definitions for the finality layer.

use std::fmt;
use std::str::FromStr;

use hashes::{hash160, hash_newtype, sha256d};
use serde::{Deserialize, Serialize};

use crate::consensus::Encodable;
use crate::error::ConfigError;
use crate::pow::{CompactTarget, CompactTargetError, Target};

hash_newtype! {
    /// A Dash block hash.
    pub struct BlockHash(sha256d::Hash);
    /// A transaction id.
    pub struct Txid(sha256d::Hash);
    /// Hash of a masternode's provider registration transaction.
    pub struct ProTxHash(sha256d::Hash);
    /// Hash of the block a quorum was formed at.
    pub struct QuorumHash(sha256d::Hash);
    /// A node of a block's transaction merkle tree.
    pub struct TxMerkleNode(sha256d::Hash);
    /// Merkle root over the simplified masternode list.
    pub struct MerkleRootMasternodeList(sha256d::Hash);
    /// Merkle root over the active quorum commitments.
    pub struct MerkleRootQuorums(sha256d::Hash);
    /// Hash of a quorum's verification vector.
    pub struct QuorumVVecHash(sha256d::Hash);
    /// HASH160 of a public key.
    pub struct PubkeyHash(hash160::Hash);
}

/// Dash networks supported by the finality layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Dash mainnet.
    Dash,
    /// Dash testnet.
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Dash => write!(f, "dash"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dash" | "mainnet" => Ok(Network::Dash),
            "testnet" => Ok(Network::Testnet),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

/// A reference to a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    pub txid: Txid,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Txid, vout: u32) -> Self {
        Self {
            txid,
            vout,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl Encodable for OutPoint {
    fn consensus_encode(&self, writer: &mut Vec<u8>) {
        self.txid.consensus_encode(writer);
        self.vout.consensus_encode(writer);
    }
}

/// A block header as seen by the validation layer.
///
/// The hash is computed by the caller (X11 for Dash) and the height is assigned
/// by the external chain index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub merkle_root: TxMerkleNode,
    pub timestamp: u32,
    pub bits: CompactTarget,
    pub height: u32,
}

impl BlockHeader {
    /// Decode the target this header claims to meet.
    pub fn target(&self) -> Result<Target, CompactTargetError> {
        Target::from_compact(self.bits)
    }
}

#[cfg(feature = "x11")]
impl BlockHeader {
    /// Parse an 80 byte wire header and compute its X11 hash.
    pub fn from_raw(raw: &[u8; 80], height: u32) -> Self {
        use hashes::Hash;

        let digest = rs_x11_hash::get_x11_hash(&raw[..]);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest[..32]);

        let mut prev_hash = [0u8; 32];
        prev_hash.copy_from_slice(&raw[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&raw[36..68]);

        let read_u32 = |at: usize| u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);

        Self {
            hash: BlockHash::from_byte_array(hash),
            prev_hash: BlockHash::from_byte_array(prev_hash),
            merkle_root: TxMerkleNode::from_byte_array(merkle_root),
            timestamp: read_u32(68),
            bits: CompactTarget::from_consensus(read_u32(72)),
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashes::Hash;

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Dash);
        assert_eq!("Dash".parse::<Network>().unwrap(), Network::Dash);
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert!("regtest".parse::<Network>().is_err());
    }

    #[test]
    fn test_network_serde_lowercase() {
        let json = serde_json::to_string(&Network::Testnet).unwrap();
        assert_eq!(json, "\"testnet\"");
        let network: Network = serde_json::from_str("\"dash\"").unwrap();
        assert_eq!(network, Network::Dash);
    }

    #[test]
    fn test_outpoint_encoding() {
        let outpoint = OutPoint::new(Txid::from_byte_array([7; 32]), 0x01020304);
        let bytes = outpoint.serialize();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..32], &[7; 32]);
        assert_eq!(&bytes[32..], &[0x04, 0x03, 0x02, 0x01]);
    }
}
