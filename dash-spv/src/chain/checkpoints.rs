//! Checkpoints are hardcoded blocks that anchor the header chain and the
//! masternode list diff sequence.

use hashes::Hash;

use crate::pow::CompactTarget;
use crate::types::{BlockHash, BlockHeader, Network, TxMerkleNode};

const MAINNET_GENESIS_HASH: [u8; 32] = [
    0xb6, 0x7a, 0x40, 0xf3, 0xcd, 0x58, 0x04, 0x43, 0x7a, 0x10, 0x8f, 0x10, 0x55, 0x33, 0x73, 0x9c,
    0x37, 0xe6, 0x22, 0x9b, 0xc1, 0xad, 0xca, 0xb3, 0x85, 0x14, 0x0b, 0x59, 0xfd, 0x0f, 0x00, 0x00,
];

const TESTNET_GENESIS_HASH: [u8; 32] = [
    0x2c, 0xbc, 0xf8, 0x3b, 0x62, 0x91, 0x3d, 0x56, 0xf6, 0x05, 0xc0, 0xe5, 0x81, 0xa4, 0x88, 0x72,
    0x83, 0x94, 0x28, 0xc9, 0x2e, 0x5e, 0xb7, 0x6c, 0xd7, 0xad, 0x94, 0xbc, 0xaf, 0x0b, 0x00, 0x00,
];

// Both networks share the same genesis coinbase.
const GENESIS_MERKLE_ROOT: [u8; 32] = [
    0xc7, 0x62, 0xa6, 0x56, 0x7f, 0x3c, 0xc0, 0x92, 0xf0, 0x68, 0x4b, 0xb6, 0x2b, 0x7e, 0x00, 0xa8,
    0x48, 0x90, 0xb9, 0x90, 0xf0, 0x7c, 0xc7, 0x1a, 0x6b, 0xb5, 0x8d, 0x64, 0xb9, 0x8e, 0x02, 0xe0,
];

const GENESIS_BITS: u32 = 0x1e0ffff0;

/// A hardcoded block the chain and the masternode list are anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub height: u32,
    pub block_hash: BlockHash,
    pub merkle_root: TxMerkleNode,
    pub timestamp: u32,
    pub bits: CompactTarget,
}

impl Checkpoint {
    /// The genesis block of `network`.
    pub fn genesis(network: Network) -> Self {
        let (hash, timestamp) = match network {
            Network::Dash => (MAINNET_GENESIS_HASH, 1390095618),
            Network::Testnet => (TESTNET_GENESIS_HASH, 1390666206),
        };
        Self {
            height: 0,
            block_hash: BlockHash::from_byte_array(hash),
            merkle_root: TxMerkleNode::from_byte_array(GENESIS_MERKLE_ROOT),
            timestamp,
            bits: CompactTarget::from_consensus(GENESIS_BITS),
        }
    }

    /// The checkpoint as a header usable to seed a header store.
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            hash: self.block_hash,
            prev_hash: BlockHash::all_zeros(),
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_hashes_display_like_dash_core() {
        assert_eq!(
            Checkpoint::genesis(Network::Dash).block_hash.to_string(),
            "00000ffd590b1485b3caadc19b22e6379c733355108f107a430458cdf3407ab6"
        );
        assert_eq!(
            Checkpoint::genesis(Network::Testnet).block_hash.to_string(),
            "00000bafbc94add76cb75e2ec92894837288a481e5c005f6563d91623bf8bc2c"
        );
    }

    #[test]
    fn test_genesis_header_meets_its_target() {
        for network in [Network::Dash, Network::Testnet] {
            let header = Checkpoint::genesis(network).header();
            assert_eq!(header.height, 0);
            assert!(header.target().unwrap().is_met_by(header.hash));
        }
    }
}
