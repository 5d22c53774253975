//! BLS keys, signatures and the verification boundary.
//!
//! Verification is consumed through [`BlsVerifier`] so the finality pipeline can
//! be driven by any backend. With the `bls` feature, [`BlsfulVerifier`] checks
//! basic-scheme BLS12-381 signatures (keys in G1, signatures in G2) with `blsful`.

use std::fmt;

/// A 48-byte compressed BLS public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BLSPublicKey([u8; 48]);

/// A 96-byte compressed BLS signature.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BLSSignature([u8; 96]);

macro_rules! impl_bls_bytes {
    ($name:ident, $len:expr) => {
        impl $name {
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_bytes(self) -> [u8; $len] {
                self.0
            }

            /// Whether every byte is zero, the placeholder for a missing value.
            pub fn is_zeroed(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }
    };
}

impl_bls_bytes!(BLSPublicKey, 48);
impl_bls_bytes!(BLSSignature, 96);

/// Verifies BLS signatures over 32-byte message digests.
pub trait BlsVerifier: Send + Sync {
    fn verify(&self, public_key: &BLSPublicKey, message: &[u8; 32], signature: &BLSSignature) -> bool;
}

/// Verifier backed by the `blsful` BLS12-381 implementation.
#[cfg(feature = "bls")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BlsfulVerifier;

#[cfg(feature = "bls")]
impl BlsVerifier for BlsfulVerifier {
    fn verify(&self, public_key: &BLSPublicKey, message: &[u8; 32], signature: &BLSSignature) -> bool {
        use blsful::inner_types::{G1Affine, G1Projective, G2Affine, G2Projective};
        use blsful::{Bls12381G2Impl, PublicKey, Signature};

        let Some(public_key) = Option::<G1Affine>::from(G1Affine::from_compressed(public_key.as_bytes()))
        else {
            tracing::debug!("Rejecting malformed BLS public key");
            return false;
        };
        let Some(signature) = Option::<G2Affine>::from(G2Affine::from_compressed(signature.as_bytes()))
        else {
            tracing::debug!("Rejecting malformed BLS signature");
            return false;
        };

        let public_key = PublicKey::<Bls12381G2Impl>(G1Projective::from(public_key));
        let signature = Signature::<Bls12381G2Impl>::Basic(G2Projective::from(signature));
        signature.verify(&public_key, message).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_detection() {
        assert!(BLSSignature::from_bytes([0; 96]).is_zeroed());
        let mut bytes = [0u8; 96];
        bytes[95] = 1;
        assert!(!BLSSignature::from(bytes).is_zeroed());
        assert!(BLSPublicKey::from([0; 48]).is_zeroed());
    }

    #[test]
    fn test_display_is_hex() {
        let key = BLSPublicKey::from([0xab; 48]);
        assert_eq!(key.to_string(), "ab".repeat(48));
        assert!(format!("{:?}", key).starts_with("BLSPublicKey(abab"));
    }

    #[cfg(feature = "bls")]
    #[test]
    fn test_blsful_rejects_garbage() {
        let verifier = BlsfulVerifier;
        let key = BLSPublicKey::from([0x11; 48]);
        let sig = BLSSignature::from([0x22; 96]);
        assert!(!verifier.verify(&key, &[0; 32], &sig));
    }
}
