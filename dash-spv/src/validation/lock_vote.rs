//! Legacy InstantSend lock vote validation.
//!
//! The masternodes allowed to vote on a lock are the `quorum_size` valid,
//! confirmed masternodes with the highest score for the vote's quorum
//! modifier. Scores are `sha256(sha256(proRegTxHash || confirmedHash) || modifier)`
//! compared as little-endian 256-bit integers.

use hashes::Hash;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::crypto::BlsVerifier;
use crate::ephemeral::TransactionLockVote;
use crate::error::{ConfigError, ValidationError, ValidationResult};
use crate::sml::{ListSnapshot, MasternodeEntry};
use crate::types::BlockHash;
use crate::validation::Validator;

/// Lock vote quorum parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockVoteParams {
    /// Number of masternodes selected to vote on each lock.
    pub quorum_size: usize,
    /// Distinct valid votes each input needs.
    pub required_votes: usize,
}

impl Default for LockVoteParams {
    fn default() -> Self {
        Self {
            quorum_size: 10,
            required_votes: 6,
        }
    }
}

impl LockVoteParams {
    /// `required_votes` must be a non-zero number no larger than the quorum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_votes == 0 || self.required_votes > self.quorum_size {
            return Err(ConfigError::InvalidLockVoteParams {
                quorum_size: self.quorum_size,
                required: self.required_votes,
            });
        }
        Ok(())
    }
}

/// The lock quorum for `modifier`, highest score first.
pub fn lock_quorum<'a>(snapshot: &'a ListSnapshot, modifier: &BlockHash, quorum_size: usize) -> Vec<&'a MasternodeEntry> {
    let mut scored: Vec<(U256, &MasternodeEntry)> = snapshot
        .valid_masternodes()
        .filter_map(|entry| entry.score(modifier).map(|score| (score, entry)))
        .collect();
    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score.cmp(a_score).then_with(|| a.pro_reg_tx_hash.cmp(&b.pro_reg_tx_hash))
    });
    scored.into_iter().take(quorum_size).map(|(_, entry)| entry).collect()
}

/// Validates a lock vote against one masternode list snapshot.
pub struct LockVoteValidator<'a> {
    snapshot: &'a ListSnapshot,
    verifier: &'a dyn BlsVerifier,
    quorum_size: usize,
}

impl<'a> LockVoteValidator<'a> {
    pub fn new(snapshot: &'a ListSnapshot, verifier: &'a dyn BlsVerifier, quorum_size: usize) -> Self {
        Self {
            snapshot,
            verifier,
            quorum_size,
        }
    }
}

impl Validator<&TransactionLockVote> for LockVoteValidator<'_> {
    fn validate(&self, vote: &TransactionLockVote) -> ValidationResult<()> {
        let masternode = self
            .snapshot
            .masternode(&vote.masternode_pro_tx_hash)
            .ok_or(ValidationError::MasternodeNotFound(vote.masternode_pro_tx_hash))?;

        if !masternode.is_valid {
            return Err(ValidationError::InvalidLockVote {
                outpoint: vote.outpoint,
                reason: format!("masternode {} is not valid", masternode.pro_reg_tx_hash),
            });
        }

        let selected = lock_quorum(self.snapshot, &vote.quorum_modifier_hash, self.quorum_size)
            .iter()
            .any(|entry| entry.pro_reg_tx_hash == vote.masternode_pro_tx_hash);
        if !selected {
            return Err(ValidationError::MasternodeNotInQuorum {
                pro_tx_hash: vote.masternode_pro_tx_hash,
                txid: vote.txid,
            });
        }

        if !self.verifier.verify(&masternode.operator_public_key, vote.hash().as_byte_array(), &vote.signature) {
            return Err(ValidationError::InvalidSignature(format!(
                "lock vote by {} for {}",
                vote.masternode_pro_tx_hash, vote.outpoint
            )));
        }

        tracing::debug!("Lock vote by {} for input {} verified", vote.masternode_pro_tx_hash, vote.outpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{masternode_snapshot, TestBls, VoteBuilder};
    use crate::types::{OutPoint, Txid};
    use assert_matches::assert_matches;

    fn setup(count: u8) -> (ListSnapshot, BlockHash) {
        (masternode_snapshot(count), BlockHash::from_byte_array([0x42; 32]))
    }

    #[test]
    fn test_params_validation() {
        assert!(LockVoteParams::default().validate().is_ok());
        let too_many = LockVoteParams {
            quorum_size: 10,
            required_votes: 11,
        };
        assert_matches!(too_many.validate(), Err(ConfigError::InvalidLockVoteParams { .. }));
        let none = LockVoteParams {
            quorum_size: 10,
            required_votes: 0,
        };
        assert!(none.validate().is_err());
    }

    #[test]
    fn test_lock_quorum_is_sorted_by_descending_score() {
        let (snapshot, modifier) = setup(20);
        let quorum = lock_quorum(&snapshot, &modifier, 10);
        assert_eq!(quorum.len(), 10);
        let scores: Vec<U256> = quorum.iter().map(|e| e.score(&modifier).unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        // Nobody outside the quorum outranks its last member.
        let lowest = scores[9];
        let outside = snapshot
            .masternodes()
            .filter(|e| !quorum.iter().any(|q| q.pro_reg_tx_hash == e.pro_reg_tx_hash))
            .filter_map(|e| e.score(&modifier));
        assert!(outside.into_iter().all(|score| score <= lowest));
    }

    #[test]
    fn test_lock_quorum_skips_invalid_masternodes() {
        let (snapshot, modifier) = setup(5);
        let quorum = lock_quorum(&snapshot, &modifier, 10);
        assert_eq!(quorum.len(), 5);
    }

    #[test]
    fn test_vote_from_selected_masternode_is_valid() {
        let (snapshot, modifier) = setup(20);
        let verifier = TestBls;
        let member = lock_quorum(&snapshot, &modifier, 10)[0].clone();
        let input = OutPoint::new(Txid::from_byte_array([7; 32]), 0);
        let vote = VoteBuilder::new(Txid::from_byte_array([1; 32]), input, modifier).signed_by(&member);

        let validator = LockVoteValidator::new(&snapshot, &verifier, 10);
        assert!(validator.validate(&vote).is_ok());
    }

    #[test]
    fn test_vote_from_unselected_masternode_is_rejected() {
        let (snapshot, modifier) = setup(20);
        let verifier = TestBls;
        let quorum = lock_quorum(&snapshot, &modifier, 10);
        let outsider = snapshot
            .valid_masternodes()
            .find(|e| !quorum.iter().any(|q| q.pro_reg_tx_hash == e.pro_reg_tx_hash))
            .unwrap()
            .clone();
        let input = OutPoint::new(Txid::from_byte_array([7; 32]), 0);
        let vote = VoteBuilder::new(Txid::from_byte_array([1; 32]), input, modifier).signed_by(&outsider);

        let validator = LockVoteValidator::new(&snapshot, &verifier, 10);
        assert_matches!(validator.validate(&vote), Err(ValidationError::MasternodeNotInQuorum { .. }));
    }

    #[test]
    fn test_unknown_masternode_and_bad_signature() {
        let (snapshot, modifier) = setup(20);
        let verifier = TestBls;
        let member = lock_quorum(&snapshot, &modifier, 10)[0].clone();
        let input = OutPoint::new(Txid::from_byte_array([7; 32]), 0);
        let validator = LockVoteValidator::new(&snapshot, &verifier, 10);

        let mut forged = VoteBuilder::new(Txid::from_byte_array([1; 32]), input, modifier).signed_by(&member);
        forged.txid = Txid::from_byte_array([2; 32]);
        assert_matches!(validator.validate(&forged), Err(ValidationError::InvalidSignature(_)));

        let mut stranger = VoteBuilder::new(Txid::from_byte_array([1; 32]), input, modifier).signed_by(&member);
        stranger.masternode_pro_tx_hash = crate::types::ProTxHash::from_byte_array([0xee; 32]);
        assert_matches!(validator.validate(&stranger), Err(ValidationError::MasternodeNotFound(_)));
    }
}
