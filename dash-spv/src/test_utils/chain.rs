use hashes::{sha256d, Hash};

use crate::chain::params::MAX_TARGET_BITS;
use crate::pow::CompactTarget;
use crate::types::{BlockHash, BlockHeader, TxMerkleNode};

const FIRST_TIMESTAMP: u32 = 1_700_000_000;
const DEFAULT_SPACING: u32 = 150;

/// Builds linked header chains with deterministic hashes.
///
/// Hashes have their most significant eight bytes cleared so that they meet
/// any target down to `0x1b` exponents.
#[derive(Debug, Clone)]
pub struct HeaderChainBuilder {
    height: u32,
    prev_hash: BlockHash,
    prev_timestamp: Option<u32>,
    bits: u32,
    spacing: u32,
    seed: u8,
}

impl HeaderChainBuilder {
    /// A chain whose first header sits at `start_height`.
    pub fn new(start_height: u32) -> Self {
        let prev_hash = match start_height.checked_sub(1) {
            Some(parent) => low_hash(0, parent, &BlockHash::all_zeros()),
            None => BlockHash::all_zeros(),
        };
        Self {
            height: start_height,
            prev_hash,
            prev_timestamp: None,
            bits: MAX_TARGET_BITS,
            spacing: DEFAULT_SPACING,
            seed: 0,
        }
    }

    /// A chain continuing from `tip`.
    pub fn after(tip: &BlockHeader) -> Self {
        Self {
            height: tip.height + 1,
            prev_hash: tip.hash,
            prev_timestamp: Some(tip.timestamp),
            bits: MAX_TARGET_BITS,
            spacing: DEFAULT_SPACING,
            seed: 0,
        }
    }

    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Seconds between consecutive headers.
    pub fn spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Distinct seeds give distinct hashes for the same heights.
    pub fn seed(mut self, seed: u8) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self, count: usize) -> Vec<BlockHeader> {
        let mut headers = Vec::with_capacity(count);
        let mut prev_hash = self.prev_hash;
        let mut timestamp = match self.prev_timestamp {
            Some(previous) => previous + self.spacing,
            None => FIRST_TIMESTAMP,
        };

        for height in self.height..self.height + count as u32 {
            let hash = low_hash(self.seed, height, &prev_hash);
            let merkle_root = TxMerkleNode::from_raw_hash(sha256d::Hash::hash(hash.as_byte_array()));
            headers.push(BlockHeader {
                hash,
                prev_hash,
                merkle_root,
                timestamp,
                bits: CompactTarget::from_consensus(self.bits),
                height,
            });
            prev_hash = hash;
            timestamp += self.spacing;
        }
        headers
    }
}

fn low_hash(seed: u8, height: u32, prev_hash: &BlockHash) -> BlockHash {
    let mut preimage = Vec::with_capacity(37);
    preimage.push(seed);
    preimage.extend_from_slice(&height.to_le_bytes());
    preimage.extend_from_slice(prev_hash.as_byte_array());
    let mut bytes = sha256d::Hash::hash(&preimage).to_byte_array();
    bytes[24..].fill(0);
    BlockHash::from_byte_array(bytes)
}
