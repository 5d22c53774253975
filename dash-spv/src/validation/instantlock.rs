//! InstantLock validation functionality.

use hashes::Hash;

use crate::crypto::BlsVerifier;
use crate::ephemeral::InstantLock;
use crate::error::{ValidationError, ValidationResult};
use crate::sml::ListSnapshot;
use crate::types::{OutPoint, Txid};
use crate::validation::Validator;

/// Validates InstantLock messages against the quorum they are attributed to.
/// Never accept InstantLocks from the network without full signature
/// verification.
pub struct InstantLockValidator<'a> {
    snapshot: &'a ListSnapshot,
    verifier: &'a dyn BlsVerifier,
}

impl Validator<&InstantLock> for InstantLockValidator<'_> {
    /// Validate an InstantLock: structure first, then the quorum's threshold
    /// signature over the lock's sign id.
    fn validate(&self, instant_lock: &InstantLock) -> ValidationResult<()> {
        Self::validate_structure(instant_lock)?;
        self.validate_signature(instant_lock)?;

        tracing::debug!("InstantLock fully validated (structure + signature) for txid {}", instant_lock.txid);

        Ok(())
    }
}

impl<'a> InstantLockValidator<'a> {
    pub fn new(snapshot: &'a ListSnapshot, verifier: &'a dyn BlsVerifier) -> Self {
        Self {
            snapshot,
            verifier,
        }
    }

    /// Checks that need neither a quorum nor the transaction.
    pub(crate) fn validate_structure(instant_lock: &InstantLock) -> ValidationResult<()> {
        if instant_lock.txid == Txid::all_zeros() {
            return Err(ValidationError::InvalidInstantLock(
                "InstantLock transaction ID cannot be zero".to_string(),
            ));
        }

        if instant_lock.signature.is_zeroed() {
            return Err(ValidationError::InvalidInstantLock("InstantLock signature cannot be zero".to_string()));
        }

        if instant_lock.inputs.is_empty() {
            return Err(ValidationError::InvalidInstantLock(
                "InstantLock must have at least one input".to_string(),
            ));
        }

        for (idx, input) in instant_lock.inputs.iter().enumerate() {
            if input.txid == Txid::all_zeros() {
                return Err(ValidationError::InvalidInstantLock(format!(
                    "InstantLock input {} has null transaction ID",
                    idx
                )));
            }
        }

        Ok(())
    }

    /// The lock must spend exactly the inputs of the transaction it claims.
    pub(crate) fn validate_inputs(instant_lock: &InstantLock, transaction_inputs: &[OutPoint]) -> ValidationResult<()> {
        let mut locked = instant_lock.inputs.clone();
        let mut spent = transaction_inputs.to_vec();
        locked.sort_unstable();
        spent.sort_unstable();
        if locked != spent {
            return Err(ValidationError::InvalidInstantLock(format!(
                "InstantLock inputs do not match transaction {} ({} locked, {} spent)",
                instant_lock.txid,
                instant_lock.inputs.len(),
                transaction_inputs.len()
            )));
        }
        Ok(())
    }

    fn validate_signature(&self, instant_lock: &InstantLock) -> ValidationResult<()> {
        let quorum = self.snapshot.quorum(instant_lock.llmq_type, &instant_lock.quorum_hash).ok_or(
            ValidationError::QuorumNotFound {
                llmq_type: instant_lock.llmq_type,
                quorum_hash: instant_lock.quorum_hash,
            },
        )?;

        let sign_id = instant_lock.sign_id();
        if !self.verifier.verify(&quorum.quorum_public_key, sign_id.as_byte_array(), &instant_lock.signature) {
            return Err(ValidationError::InvalidSignature(format!(
                "InstantLock BLS signature verification failed for txid {}",
                instant_lock.txid
            )));
        }

        tracing::debug!(
            "InstantLock signature verified for txid {} using quorum {}",
            instant_lock.txid,
            quorum.key()
        );

        Ok(())
    }
}
