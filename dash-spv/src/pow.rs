//! Compact target ("bits") arithmetic.
//!
//! Targets are 256-bit unsigned integers stored in headers using the compact
//! mantissa/exponent encoding. A block hash, read as a little-endian 256-bit
//! integer, meets a target when it is less than or equal to it.

use std::fmt;

use hashes::Hash;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BlockHash;

/// The compact "bits" field of a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactTarget(u32);

impl CompactTarget {
    pub const fn from_consensus(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn to_consensus(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Errors decoding a compact target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompactTargetError {
    #[error("compact target {0} has the sign bit set")]
    Negative(CompactTarget),
    #[error("compact target {0} overflows 256 bits")]
    Overflow(CompactTarget),
}

/// A 256-bit proof of work target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target(U256);

impl Target {
    pub const ZERO: Target = Target(U256([0; 4]));

    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decode a compact target, rejecting negative and overflowing encodings.
    pub fn from_compact(bits: CompactTarget) -> Result<Self, CompactTargetError> {
        let compact = bits.to_consensus();
        let size = compact >> 24;
        let word = compact & 0x007f_ffff;

        let value = if size <= 3 {
            U256::from(word >> (8 * (3 - size)))
        } else {
            // Shifts of 256 bits or more yield zero; the overflow check below catches them.
            U256::from(word) << (8 * (size as usize - 3))
        };

        if word != 0 && (compact & 0x0080_0000) != 0 {
            return Err(CompactTargetError::Negative(bits));
        }
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        if overflow {
            return Err(CompactTargetError::Overflow(bits));
        }
        Ok(Self(value))
    }

    /// Encode into the canonical compact representation.
    pub fn to_compact(self) -> CompactTarget {
        let mut size = self.0.bits().div_ceil(8) as u32;
        let mut compact = if size <= 3 {
            self.0.low_u64() << (8 * (3 - size))
        } else {
            (self.0 >> (8 * (size as usize - 3))).low_u64()
        } as u32;

        // The 0x00800000 bit is the sign bit; move into the exponent when it would be set.
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        CompactTarget::from_consensus(compact | (size << 24))
    }

    /// Whether `hash`, read as a little-endian 256-bit integer, meets this target.
    pub fn is_met_by(&self, hash: BlockHash) -> bool {
        U256::from_little_endian(hash.as_byte_array()) <= self.0
    }
}
