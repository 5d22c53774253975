//! Per-transaction InstantSend state.

use std::collections::{BTreeMap, BTreeSet};

use crate::ephemeral::InstantLock;
use crate::event_bus::FinalityPath;
use crate::types::{OutPoint, ProTxHash, Txid};

/// Distinct locks kept per transaction while their quorum is unknown.
pub const MAX_PENDING_LOCKS: usize = 8;

/// Lifecycle of a transaction in the InstantSend pipeline.
///
/// Statuses only move forward; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum InstantSendStatus {
    /// Never observed, or purged.
    #[default]
    None,
    /// Observed, no valid claim yet.
    Requested,
    /// At least one valid vote, or a lock waiting for its quorum.
    Processing,
    /// Instantly final.
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantTransactionState {
    txid: Txid,
    status: InstantSendStatus,
    inputs: Option<Vec<OutPoint>>,
    votes: BTreeMap<OutPoint, BTreeSet<ProTxHash>>,
    pending_locks: Vec<InstantLock>,
    path: Option<FinalityPath>,
}

impl InstantTransactionState {
    pub fn new(txid: Txid) -> Self {
        Self {
            txid,
            status: InstantSendStatus::Requested,
            inputs: None,
            votes: BTreeMap::new(),
            pending_locks: Vec::new(),
            path: None,
        }
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    pub fn status(&self) -> InstantSendStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == InstantSendStatus::Done
    }

    /// Inputs of the transaction, once the wallet has seen it.
    pub fn inputs(&self) -> Option<&[OutPoint]> {
        self.inputs.as_deref()
    }

    /// Distinct masternodes that voted to lock `outpoint`.
    pub fn vote_count(&self, outpoint: &OutPoint) -> usize {
        self.votes.get(outpoint).map_or(0, BTreeSet::len)
    }

    /// Every masternode with at least one accepted vote.
    pub fn voters(&self) -> BTreeSet<ProTxHash> {
        self.votes.values().flatten().copied().collect()
    }

    /// Locks waiting for their quorum, oldest first.
    pub fn pending_locks(&self) -> &[InstantLock] {
        &self.pending_locks
    }

    pub fn path(&self) -> Option<FinalityPath> {
        self.path
    }

    /// Move to `status` if it is ahead of the current one.
    pub(super) fn advance(&mut self, status: InstantSendStatus) -> bool {
        if status <= self.status {
            return false;
        }
        self.status = status;
        true
    }

    /// Record the transaction's inputs. Votes for other outpoints are dropped.
    /// Returns `false` when the inputs were already known.
    pub(super) fn set_inputs(&mut self, inputs: Vec<OutPoint>) -> bool {
        if self.inputs.is_some() {
            return false;
        }
        self.votes.retain(|outpoint, _| inputs.contains(outpoint));
        self.inputs = Some(inputs);
        true
    }

    /// Returns `false` for a repeated vote by the same masternode.
    pub(super) fn add_vote(&mut self, outpoint: OutPoint, voter: ProTxHash) -> bool {
        self.votes.entry(outpoint).or_default().insert(voter)
    }

    /// Whether every input of the known transaction has `required` distinct voters.
    pub(super) fn votes_complete(&self, required: usize) -> bool {
        match &self.inputs {
            Some(inputs) if !inputs.is_empty() => {
                inputs.iter().all(|outpoint| self.vote_count(outpoint) >= required)
            }
            _ => false,
        }
    }

    /// Keep `lock` until its quorum is known. Locks already held with the same
    /// signature are not stored twice, and nothing is added once
    /// `MAX_PENDING_LOCKS` are held. Returns whether the lock was stored.
    pub(super) fn add_pending_lock(&mut self, lock: InstantLock) -> bool {
        if self.pending_locks.len() >= MAX_PENDING_LOCKS
            || self.pending_locks.iter().any(|held| held.signature == lock.signature)
        {
            return false;
        }
        self.pending_locks.push(lock);
        true
    }

    pub(super) fn take_pending_locks(&mut self) -> Vec<InstantLock> {
        std::mem::take(&mut self.pending_locks)
    }

    /// Created by a claim and never touched by an accepted one.
    pub(super) fn is_untouched(&self) -> bool {
        self.status == InstantSendStatus::Requested
            && self.inputs.is_none()
            && self.votes.is_empty()
            && self.pending_locks.is_empty()
    }

    /// Transition to `Done`. Returns `false` if the transaction already was.
    pub(super) fn finalize(&mut self, path: FinalityPath) -> bool {
        if self.is_done() {
            return false;
        }
        self.status = InstantSendStatus::Done;
        self.path = Some(path);
        self.pending_locks.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashes::Hash;

    fn outpoint(byte: u8) -> OutPoint {
        OutPoint::new(Txid::from_byte_array([byte; 32]), 0)
    }

    #[test]
    fn test_status_never_regresses() {
        let mut state = InstantTransactionState::new(Txid::from_byte_array([1; 32]));
        assert_eq!(state.status(), InstantSendStatus::Requested);
        assert!(state.advance(InstantSendStatus::Processing));
        assert!(!state.advance(InstantSendStatus::Requested));
        assert!(state.finalize(FinalityPath::LockVotes));
        assert!(!state.finalize(FinalityPath::InstantLock));
        assert!(!state.advance(InstantSendStatus::Processing));
        assert_eq!(state.path(), Some(FinalityPath::LockVotes));
    }

    #[test]
    fn test_votes_need_known_inputs() {
        let mut state = InstantTransactionState::new(Txid::from_byte_array([1; 32]));
        for voter in 0..3 {
            state.add_vote(outpoint(1), ProTxHash::from_byte_array([voter; 32]));
        }
        assert!(!state.add_vote(outpoint(1), ProTxHash::from_byte_array([0; 32])));
        assert_eq!(state.vote_count(&outpoint(1)), 3);
        assert!(!state.votes_complete(3));

        state.add_vote(outpoint(9), ProTxHash::from_byte_array([0; 32]));
        assert!(state.set_inputs(vec![outpoint(1)]));
        assert!(!state.set_inputs(vec![outpoint(2)]));
        assert_eq!(state.vote_count(&outpoint(9)), 0);
        assert!(state.votes_complete(3));
        assert!(!state.votes_complete(4));
    }

    #[test]
    fn test_every_input_needs_votes() {
        let mut state = InstantTransactionState::new(Txid::from_byte_array([1; 32]));
        state.set_inputs(vec![outpoint(1), outpoint(2)]);
        state.add_vote(outpoint(1), ProTxHash::from_byte_array([1; 32]));
        assert!(!state.votes_complete(1));
        state.add_vote(outpoint(2), ProTxHash::from_byte_array([1; 32]));
        assert!(state.votes_complete(1));
        assert_eq!(state.voters().len(), 1);
    }

    #[test]
    fn test_pending_locks_are_deduplicated_and_capped() {
        use crate::crypto::BLSSignature;
        use crate::test_utils::test_instant_lock;

        let quorum = crate::test_utils::test_quorum(crate::sml::LLMQType::Llmqtype50_60, 1);
        let lock = test_instant_lock(&quorum, 1);
        let mut state = InstantTransactionState::new(lock.txid);
        assert!(state.is_untouched());

        assert!(state.add_pending_lock(lock.clone()));
        assert!(!state.add_pending_lock(lock.clone()));
        assert!(!state.is_untouched());

        for byte in 1..MAX_PENDING_LOCKS as u8 {
            let mut copy = lock.clone();
            copy.signature = BLSSignature::from([byte; 96]);
            assert!(state.add_pending_lock(copy));
        }
        let mut overflow = lock.clone();
        overflow.signature = BLSSignature::from([0xfe; 96]);
        assert!(!state.add_pending_lock(overflow));
        assert_eq!(state.pending_locks().len(), MAX_PENDING_LOCKS);
        assert_eq!(state.pending_locks()[0], lock);

        assert_eq!(state.take_pending_locks().len(), MAX_PENDING_LOCKS);
        assert!(state.pending_locks().is_empty());
    }
}
