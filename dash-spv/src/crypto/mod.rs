//! Cryptographic boundaries.

pub mod bls;

pub use bls::{BLSPublicKey, BLSSignature, BlsVerifier};

#[cfg(feature = "bls")]
pub use bls::BlsfulVerifier;
