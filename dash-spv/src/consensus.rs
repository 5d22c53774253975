//! Minimal consensus serialization used for hashing.
//!
//! Only the encodings that feed commitment hashes live here: little-endian
//! integers, compact sizes, raw hashes and the packed bitsets of quorum
//! commitments. Encoding into a `Vec<u8>` cannot fail.

use hashes::Hash;

use crate::types::{
    BlockHash, MerkleRootMasternodeList, MerkleRootQuorums, ProTxHash, PubkeyHash, QuorumHash,
    QuorumVVecHash, TxMerkleNode, Txid,
};

/// Data which can be encoded in a consensus-consistent way.
pub trait Encodable {
    /// Append the consensus encoding of `self` to `writer`.
    fn consensus_encode(&self, writer: &mut Vec<u8>);

    /// Encode `self` into a fresh buffer.
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.consensus_encode(&mut buf);
        buf
    }
}

macro_rules! impl_int_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn consensus_encode(&self, writer: &mut Vec<u8>) {
                    writer.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_int_encodable!(u8, u16, u32, u64, i16, i32, i64);

macro_rules! impl_hash_encodable {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn consensus_encode(&self, writer: &mut Vec<u8>) {
                    writer.extend_from_slice(self.as_byte_array());
                }
            }
        )*
    };
}

impl_hash_encodable!(
    BlockHash,
    Txid,
    ProTxHash,
    QuorumHash,
    QuorumVVecHash,
    TxMerkleNode,
    MerkleRootMasternodeList,
    MerkleRootQuorums,
    PubkeyHash
);

/// Append a Bitcoin-style variable length integer.
pub fn write_compact_size(writer: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => writer.push(n as u8),
        0xfd..=0xffff => {
            writer.push(0xfd);
            writer.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x10000..=0xffff_ffff => {
            writer.push(0xfe);
            writer.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            writer.push(0xff);
            writer.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Append a length-prefixed byte string.
pub fn write_var_bytes(writer: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(writer, bytes.len() as u64);
    writer.extend_from_slice(bytes);
}

/// Append a length-prefixed bitset, bits packed least significant first.
pub fn write_bitset(writer: &mut Vec<u8>, bits: &[bool]) {
    write_compact_size(writer, bits.len() as u64);
    let mut packed = vec![0u8; bits.len().div_ceil(8)];
    for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        packed[i / 8] |= 1 << (i % 8);
    }
    writer.extend_from_slice(&packed);
}
