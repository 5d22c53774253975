use hashes::{sha256, Hash};

use crate::crypto::{BLSPublicKey, BLSSignature, BlsVerifier};

/// Deterministic stand-in for BLS.
///
/// A signature is `sha256(key || message)` stretched to 96 bytes, so whoever
/// knows the public key can sign. Only meant for exercising validation paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestBls;

impl TestBls {
    pub fn sign(public_key: &BLSPublicKey, message: &[u8; 32]) -> BLSSignature {
        let mut preimage = Vec::with_capacity(80);
        preimage.extend_from_slice(public_key.as_bytes());
        preimage.extend_from_slice(message);

        let mut block = sha256::Hash::hash(&preimage);
        let mut signature = [0u8; 96];
        for chunk in signature.chunks_mut(32) {
            chunk.copy_from_slice(block.as_byte_array());
            block = sha256::Hash::hash(block.as_byte_array());
        }
        BLSSignature::from(signature)
    }
}

impl BlsVerifier for TestBls {
    fn verify(&self, public_key: &BLSPublicKey, message: &[u8; 32], signature: &BLSSignature) -> bool {
        Self::sign(public_key, message) == *signature
    }
}
