//! Merkle root computation and partial merkle tree verification.
//!
//! Both the masternode list commitments and the block transaction tree use the
//! Bitcoin construction: double SHA-256 over concatenated pairs, with the last
//! node of an odd level paired with itself.

use hashes::{sha256d, Hash};
use thiserror::Error;

use crate::types::{TxMerkleNode, Txid};

/// Computes the leaf hash of a list element.
pub trait LeafHasher<T: ?Sized> {
    fn leaf_hash(&self, leaf: &T) -> sha256d::Hash;
}

impl<T: ?Sized, F> LeafHasher<T> for F
where
    F: Fn(&T) -> sha256d::Hash,
{
    fn leaf_hash(&self, leaf: &T) -> sha256d::Hash {
        self(leaf)
    }
}

#[inline]
fn hash_pair(left: &sha256d::Hash, right: &sha256d::Hash) -> sha256d::Hash {
    let mut buffer = [0u8; 64];
    buffer[..32].copy_from_slice(left.as_byte_array());
    buffer[32..].copy_from_slice(right.as_byte_array());
    sha256d::Hash::hash(&buffer)
}

/// Merkle root of an ordered list of leaf hashes, `None` when the list is empty.
pub fn merkle_root_from_hashes<I>(hashes: I) -> Option<sha256d::Hash>
where
    I: IntoIterator<Item = sha256d::Hash>,
{
    let mut level: Vec<sha256d::Hash> = hashes.into_iter().collect();
    if level.is_empty() {
        return None;
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
    }
    level.pop()
}

/// Merkle root of `leaves` hashed with `hasher`; an empty list yields the all-zero root.
pub fn merkle_root<'a, T, H, I>(leaves: I, hasher: &H) -> sha256d::Hash
where
    T: 'a + ?Sized,
    H: LeafHasher<T>,
    I: IntoIterator<Item = &'a T>,
{
    merkle_root_from_hashes(leaves.into_iter().map(|leaf| hasher.leaf_hash(leaf)))
        .unwrap_or_else(sha256d::Hash::all_zeros)
}

/// Check that `leaves` commit to `claimed`.
pub fn verify_merkle_root<'a, T, H, I>(leaves: I, hasher: &H, claimed: sha256d::Hash) -> bool
where
    T: 'a + ?Sized,
    H: LeafHasher<T>,
    I: IntoIterator<Item = &'a T>,
{
    merkle_root(leaves, hasher) == claimed
}

/// Upper bound on the number of transactions a Dash block can hold.
const MAX_BLOCK_TRANSACTIONS: u32 = 2_000_000 / 60;

/// Errors from partial merkle tree verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleBlockError {
    #[error("partial merkle tree contains no transactions")]
    NoTransactions,
    #[error("partial merkle tree claims too many transactions")]
    TooManyTransactions,
    #[error("proof contains more hashes than transactions")]
    TooManyHashes,
    #[error("proof contains fewer flag bits than hashes")]
    NotEnoughBits,
    #[error("overflowed the flag bits array")]
    BitsArrayOverflow,
    #[error("overflowed the hashes array")]
    HashesArrayOverflow,
    #[error("not all flag bits were consumed")]
    NotAllBitsConsumed,
    #[error("not all hashes were consumed")]
    NotAllHashesConsumed,
    #[error("identical left and right hashes found")]
    IdenticalHashesFound,
    #[error("match flags do not line up with the transaction list")]
    MatchesLengthMismatch,
}

/// A BIP37 partial merkle tree proving inclusion of a subset of a block's transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMerkleTree {
    pub total_transactions: u32,
    pub hashes: Vec<TxMerkleNode>,
    pub flags: Vec<bool>,
}

impl PartialMerkleTree {
    /// Build a proof for the transactions flagged in `matches`.
    pub fn from_txids(txids: &[Txid], matches: &[bool]) -> Result<Self, MerkleBlockError> {
        if txids.is_empty() {
            return Err(MerkleBlockError::NoTransactions);
        }
        if txids.len() != matches.len() {
            return Err(MerkleBlockError::MatchesLengthMismatch);
        }
        let mut pmt = PartialMerkleTree {
            total_transactions: txids.len() as u32,
            hashes: Vec::new(),
            flags: Vec::new(),
        };
        let mut height = 0;
        while pmt.calc_tree_width(height) > 1 {
            height += 1;
        }
        pmt.traverse_and_build(height, 0, txids, matches);
        Ok(pmt)
    }

    /// Verify the proof and return its merkle root together with the matched
    /// transactions as `(position, txid)` pairs.
    pub fn extract_matches(&self) -> Result<(TxMerkleNode, Vec<(u32, Txid)>), MerkleBlockError> {
        if self.total_transactions == 0 {
            return Err(MerkleBlockError::NoTransactions);
        }
        if self.total_transactions > MAX_BLOCK_TRANSACTIONS {
            return Err(MerkleBlockError::TooManyTransactions);
        }
        if self.hashes.len() as u32 > self.total_transactions {
            return Err(MerkleBlockError::TooManyHashes);
        }
        if self.flags.len() < self.hashes.len() {
            return Err(MerkleBlockError::NotEnoughBits);
        }

        let mut height = 0;
        while self.calc_tree_width(height) > 1 {
            height += 1;
        }

        let mut bits_used = 0u32;
        let mut hash_used = 0u32;
        let mut matches = Vec::new();
        let root = self.traverse_and_extract(height, 0, &mut bits_used, &mut hash_used, &mut matches)?;

        // Every flag byte must be consumed, allowing only for padding bits.
        if (bits_used as usize).div_ceil(8) != self.flags.len().div_ceil(8) {
            return Err(MerkleBlockError::NotAllBitsConsumed);
        }
        if hash_used as usize != self.hashes.len() {
            return Err(MerkleBlockError::NotAllHashesConsumed);
        }
        Ok((TxMerkleNode::from_raw_hash(root), matches))
    }

    fn calc_tree_width(&self, height: u32) -> u32 {
        (self.total_transactions + (1 << height) - 1) >> height
    }

    fn calc_hash(&self, height: u32, pos: u32, txids: &[Txid]) -> sha256d::Hash {
        if height == 0 {
            return txids[pos as usize].to_raw_hash();
        }
        let left = self.calc_hash(height - 1, pos * 2, txids);
        let right = if pos * 2 + 1 < self.calc_tree_width(height - 1) {
            self.calc_hash(height - 1, pos * 2 + 1, txids)
        } else {
            left
        };
        hash_pair(&left, &right)
    }

    fn traverse_and_build(&mut self, height: u32, pos: u32, txids: &[Txid], matches: &[bool]) {
        let mut parent_of_match = false;
        let mut p = pos << height;
        while p < (pos + 1) << height && p < self.total_transactions {
            parent_of_match |= matches[p as usize];
            p += 1;
        }
        self.flags.push(parent_of_match);

        if height == 0 || !parent_of_match {
            let hash = self.calc_hash(height, pos, txids);
            self.hashes.push(TxMerkleNode::from_raw_hash(hash));
        } else {
            self.traverse_and_build(height - 1, pos * 2, txids, matches);
            if pos * 2 + 1 < self.calc_tree_width(height - 1) {
                self.traverse_and_build(height - 1, pos * 2 + 1, txids, matches);
            }
        }
    }

    fn traverse_and_extract(
        &self,
        height: u32,
        pos: u32,
        bits_used: &mut u32,
        hash_used: &mut u32,
        matches: &mut Vec<(u32, Txid)>,
    ) -> Result<sha256d::Hash, MerkleBlockError> {
        if *bits_used as usize >= self.flags.len() {
            return Err(MerkleBlockError::BitsArrayOverflow);
        }
        let parent_of_match = self.flags[*bits_used as usize];
        *bits_used += 1;

        if height == 0 || !parent_of_match {
            if *hash_used as usize >= self.hashes.len() {
                return Err(MerkleBlockError::HashesArrayOverflow);
            }
            let hash = self.hashes[*hash_used as usize];
            *hash_used += 1;
            if height == 0 && parent_of_match {
                matches.push((pos, Txid::from_raw_hash(hash.to_raw_hash())));
            }
            return Ok(hash.to_raw_hash());
        }

        let left = self.traverse_and_extract(height - 1, pos * 2, bits_used, hash_used, matches)?;
        let right = if pos * 2 + 1 < self.calc_tree_width(height - 1) {
            let right =
                self.traverse_and_extract(height - 1, pos * 2 + 1, bits_used, hash_used, matches)?;
            if right == left {
                return Err(MerkleBlockError::IdenticalHashesFound);
            }
            right
        } else {
            left
        };
        Ok(hash_pair(&left, &right))
    }
}
