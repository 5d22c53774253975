//! InstantSend finality pipeline.
//!
//! Accepts legacy lock votes (`txlvote`), deterministic-quorum locks (`islock`)
//! and the wallet's own view of transactions, and decides when a transaction is
//! instantly final. Each transaction has its own state behind its own mutex, so
//! claims for different transactions never contend. Locks whose quorum is not
//! yet in the masternode list are kept and retried after the next diff.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::crypto::BlsVerifier;
use crate::ephemeral::{InstantLock, TransactionLockVote};
use crate::error::ValidationError;
use crate::event_bus::{EventBus, EventReceiver, FinalityEvent, FinalityPath};
use crate::sync::instantsend::{InstantSendProgress, InstantSendStatus, InstantTransactionState};
use crate::sync::masternodes::ListReader;
use crate::types::{OutPoint, Txid};
use crate::validation::{InstantLockValidator, LockVoteParams, LockVoteValidator, Validator};

/// Result of handing a claim or transaction to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// The transaction became final with this claim.
    Finalized(FinalityPath),
    /// Accepted, but the transaction is not final yet.
    Pending,
    /// The transaction was already final; nothing changed.
    AlreadyFinal,
    /// The claim was invalid and discarded.
    Rejected(ValidationError),
    /// Shutdown was requested; the claim was dropped.
    ShuttingDown,
}

type SharedState = Arc<Mutex<InstantTransactionState>>;

pub struct InstantSendPipeline {
    states: DashMap<Txid, SharedState>,
    lists: ListReader,
    verifier: Arc<dyn BlsVerifier>,
    params: LockVoteParams,
    events: EventBus<FinalityEvent>,
    progress: Mutex<InstantSendProgress>,
    shutdown: CancellationToken,
}

impl InstantSendPipeline {
    pub fn new(
        lists: ListReader,
        verifier: Arc<dyn BlsVerifier>,
        params: LockVoteParams,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            states: DashMap::new(),
            lists,
            verifier,
            params,
            events: EventBus::default(),
            progress: Mutex::new(InstantSendProgress::default()),
            shutdown,
        }
    }

    /// Subscribe to finality events. Only events emitted afterwards are delivered.
    pub fn subscribe(&self) -> EventReceiver<FinalityEvent> {
        self.events.subscribe()
    }

    pub fn progress(&self) -> InstantSendProgress {
        self.progress_mut().clone()
    }

    /// `InstantSendStatus::None` for transactions never seen or purged.
    pub fn status(&self, txid: &Txid) -> InstantSendStatus {
        self.states.get(txid).map(|entry| lock_state(entry.value()).status()).unwrap_or_default()
    }

    pub fn state(&self, txid: &Txid) -> Option<InstantTransactionState> {
        self.states.get(txid).map(|entry| lock_state(entry.value()).clone())
    }

    pub fn is_instant(&self, txid: &Txid) -> bool {
        self.status(txid) == InstantSendStatus::Done
    }

    /// Forget a transaction, e.g. once it is buried in the chain.
    pub fn purge(&self, txid: &Txid) -> bool {
        match self.states.remove(txid) {
            Some((_, state)) => {
                if !lock_state(&state).pending_locks().is_empty() {
                    self.progress_mut().remove_pending();
                }
                tracing::debug!("Purged InstantSend state for {}", txid);
                true
            }
            None => false,
        }
    }

    pub fn tracked_transactions(&self) -> usize {
        self.states.len()
    }

    /// The wallet saw `txid` spending `inputs`.
    pub fn on_transaction(&self, txid: Txid, inputs: Vec<OutPoint>) -> LockOutcome {
        if self.shutdown.is_cancelled() {
            return LockOutcome::ShuttingDown;
        }

        let shared = self.entry(txid);
        let mut state = lock_state(&shared);
        if state.is_done() {
            return LockOutcome::AlreadyFinal;
        }
        if !state.set_inputs(inputs) {
            tracing::debug!("Inputs of {} already known", txid);
        }

        if state.votes_complete(self.params.required_votes) {
            return self.finalize(&mut state, FinalityPath::LockVotes);
        }

        let pending = self.take_pending(&mut state);
        if pending.is_empty() {
            return LockOutcome::Pending;
        }

        let transaction_inputs = state.inputs().unwrap_or_default().to_vec();
        let mut rejection = None;
        let mut matching = Vec::with_capacity(pending.len());
        for lock in pending {
            match InstantLockValidator::validate_inputs(&lock, &transaction_inputs) {
                Ok(()) => matching.push(lock),
                Err(e) => rejection = Some(self.reject(txid, e)),
            }
        }
        match (matching.is_empty(), rejection) {
            (true, Some(rejected)) => rejected,
            _ => self.verify_locks(&mut state, matching),
        }
    }

    /// Legacy path: one masternode's vote for one input.
    pub fn on_vote(&self, vote: TransactionLockVote) -> LockOutcome {
        if self.shutdown.is_cancelled() {
            return LockOutcome::ShuttingDown;
        }

        let txid = vote.txid;
        let shared = self.entry(txid);
        let outcome = self.apply_vote(&mut lock_state(&shared), vote);
        drop(shared);
        self.forget_if_rejected(&txid, &outcome);
        outcome
    }

    /// Deterministic-quorum path.
    pub fn on_lock(&self, lock: InstantLock) -> LockOutcome {
        if self.shutdown.is_cancelled() {
            return LockOutcome::ShuttingDown;
        }

        let txid = lock.txid;
        let shared = self.entry(txid);
        let outcome = self.apply_lock(&mut lock_state(&shared), lock);
        drop(shared);
        self.forget_if_rejected(&txid, &outcome);
        outcome
    }

    /// Re-verify locks that were waiting for their quorum against the current
    /// masternode list. Returns the outcome per retried transaction.
    pub fn retry_pending(&self) -> Vec<(Txid, LockOutcome)> {
        // Collect first so no map shard stays locked while a state mutex is taken.
        let candidates: Vec<(Txid, SharedState)> =
            self.states.iter().map(|entry| (*entry.key(), entry.value().clone())).collect();

        let mut outcomes = Vec::new();
        for (txid, shared) in candidates {
            if self.shutdown.is_cancelled() {
                break;
            }
            let mut state = lock_state(&shared);
            let pending = self.take_pending(&mut state);
            if pending.is_empty() {
                continue;
            }
            outcomes.push((txid, self.verify_locks(&mut state, pending)));
        }

        if !outcomes.is_empty() {
            tracing::debug!("Retried pending InstantLocks of {} transactions", outcomes.len());
        }
        outcomes
    }

    fn apply_vote(&self, state: &mut InstantTransactionState, vote: TransactionLockVote) -> LockOutcome {
        if state.is_done() {
            tracing::debug!("Lock vote for already final transaction {}", vote.txid);
            return LockOutcome::AlreadyFinal;
        }

        if let Some(inputs) = state.inputs() {
            if !inputs.contains(&vote.outpoint) {
                return self.reject(
                    vote.txid,
                    ValidationError::InvalidLockVote {
                        outpoint: vote.outpoint,
                        reason: format!("input is not spent by {}", vote.txid),
                    },
                );
            }
        }

        let snapshot = self.lists.snapshot();
        let validator = LockVoteValidator::new(&snapshot, self.verifier.as_ref(), self.params.quorum_size);
        if let Err(e) = validator.validate(&vote) {
            return self.reject(vote.txid, e);
        }

        if !state.add_vote(vote.outpoint, vote.masternode_pro_tx_hash) {
            tracing::debug!("Duplicate lock vote by {} for {}", vote.masternode_pro_tx_hash, vote.outpoint);
        }
        state.advance(InstantSendStatus::Processing);

        if state.votes_complete(self.params.required_votes) {
            return self.finalize(state, FinalityPath::LockVotes);
        }
        LockOutcome::Pending
    }

    fn apply_lock(&self, state: &mut InstantTransactionState, lock: InstantLock) -> LockOutcome {
        if state.is_done() {
            tracing::debug!("InstantLock for already final transaction {}", lock.txid);
            return LockOutcome::AlreadyFinal;
        }

        if let Err(e) = InstantLockValidator::validate_structure(&lock) {
            return self.reject(lock.txid, e);
        }
        if let Some(inputs) = state.inputs() {
            if let Err(e) = InstantLockValidator::validate_inputs(&lock, inputs) {
                return self.reject(lock.txid, e);
            }
        }

        // Locks already pending stay pending; only the new one is checked here.
        self.verify_locks(state, vec![lock])
    }

    /// Verify each lock whose quorum is known and finalize on the first valid
    /// one. Locks whose quorum is still unknown are kept pending; invalid ones
    /// are discarded without affecting the others.
    fn verify_locks(&self, state: &mut InstantTransactionState, locks: Vec<InstantLock>) -> LockOutcome {
        let snapshot = self.lists.snapshot();
        let validator = InstantLockValidator::new(&snapshot, self.verifier.as_ref());

        let mut waiting = Vec::new();
        let mut rejection = None;
        for lock in locks {
            if snapshot.quorum(lock.llmq_type, &lock.quorum_hash).is_none() {
                tracing::debug!(
                    "Quorum {}:{} for InstantLock {} not in list at height {}, keeping it pending",
                    lock.llmq_type,
                    lock.quorum_hash,
                    lock.txid,
                    snapshot.height()
                );
                waiting.push(lock);
                continue;
            }
            match validator.validate(&lock) {
                Ok(()) => return self.finalize(state, FinalityPath::InstantLock),
                Err(e) => rejection = Some(self.reject(lock.txid, e)),
            }
        }

        let had_pending = !state.pending_locks().is_empty();
        let mut kept = false;
        for lock in waiting {
            if state.add_pending_lock(lock) {
                kept = true;
            } else {
                tracing::debug!("Not keeping another pending InstantLock for {}", state.txid());
            }
        }
        if kept && !had_pending {
            self.progress_mut().add_pending();
        }

        if !state.pending_locks().is_empty() {
            state.advance(InstantSendStatus::Processing);
        }
        match rejection {
            Some(rejected) if !kept => rejected,
            _ => LockOutcome::Pending,
        }
    }

    /// Take every pending lock of `state` out for verification.
    fn take_pending(&self, state: &mut InstantTransactionState) -> Vec<InstantLock> {
        let pending = state.take_pending_locks();
        if !pending.is_empty() {
            self.progress_mut().remove_pending();
        }
        pending
    }

    fn finalize(&self, state: &mut InstantTransactionState, path: FinalityPath) -> LockOutcome {
        if !state.pending_locks().is_empty() {
            self.progress_mut().remove_pending();
        }
        if !state.finalize(path) {
            return LockOutcome::AlreadyFinal;
        }
        self.progress_mut().add_finalized(1);
        tracing::info!("Transaction {} is instantly final via {}", state.txid(), path);
        self.events.emit(&[FinalityEvent {
            txid: state.txid(),
            path,
        }]);
        LockOutcome::Finalized(path)
    }

    fn reject(&self, txid: Txid, error: ValidationError) -> LockOutcome {
        tracing::warn!("Discarding InstantSend claim for {}: {}", txid, error);
        self.progress_mut().add_invalid(1);
        LockOutcome::Rejected(error)
    }

    /// Drop the entry a rejected claim created, unless anything else has been
    /// recorded for the transaction or another claim is holding it.
    fn forget_if_rejected(&self, txid: &Txid, outcome: &LockOutcome) {
        if !matches!(outcome, LockOutcome::Rejected(_)) {
            return;
        }
        let removed = self
            .states
            .remove_if(txid, |_, shared| Arc::strong_count(shared) == 1 && lock_state(shared).is_untouched());
        if removed.is_some() {
            tracing::trace!("Dropped InstantSend state for {} after rejected claim", txid);
        }
    }

    fn entry(&self, txid: Txid) -> SharedState {
        self.states
            .entry(txid)
            .or_insert_with(|| {
                tracing::trace!("Tracking InstantSend state for {}", txid);
                Arc::new(Mutex::new(InstantTransactionState::new(txid)))
            })
            .clone()
    }

    fn progress_mut(&self) -> MutexGuard<'_, InstantSendProgress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_state(state: &SharedState) -> MutexGuard<'_, InstantTransactionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sml::{ListSnapshot, LLMQType};
    use crate::storage::{MemoryHeaderStore, MemoryMasternodeListSink};
    use crate::sync::masternodes::MasternodeListManager;
    use crate::test_utils::{
        masternode_snapshot, quorum_snapshot, test_instant_lock, test_quorum, DiffBuilder, TestBls, VoteBuilder,
    };
    use crate::types::BlockHash;
    use crate::validation::lock_quorum;
    use assert_matches::assert_matches;
    use hashes::Hash;

    fn pipeline_over(snapshot: ListSnapshot) -> (InstantSendPipeline, MasternodeListManager, Arc<MemoryHeaderStore>) {
        let headers = Arc::new(MemoryHeaderStore::new());
        let manager = MasternodeListManager::new(
            snapshot,
            headers.clone(),
            Arc::new(MemoryMasternodeListSink::new()),
            CancellationToken::new(),
        );
        let pipeline = InstantSendPipeline::new(
            manager.reader(),
            Arc::new(TestBls),
            LockVoteParams::default(),
            CancellationToken::new(),
        );
        (pipeline, manager, headers)
    }

    #[test]
    fn test_lock_with_known_quorum_finalizes_once() {
        let (snapshot, quorum) = quorum_snapshot(LLMQType::Llmqtype50_60, 1);
        let (pipeline, _manager, _) = pipeline_over(snapshot);
        let mut events = pipeline.subscribe();
        let lock = test_instant_lock(&quorum, 2);
        let txid = lock.txid;

        assert_eq!(pipeline.status(&txid), InstantSendStatus::None);
        assert_eq!(pipeline.on_lock(lock.clone()), LockOutcome::Finalized(FinalityPath::InstantLock));
        assert!(pipeline.is_instant(&txid));
        assert_eq!(pipeline.on_lock(lock), LockOutcome::AlreadyFinal);

        assert_eq!(
            events.try_recv(),
            Some(FinalityEvent {
                txid,
                path: FinalityPath::InstantLock
            })
        );
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn test_invalid_lock_leaves_state_untouched() {
        let (snapshot, quorum) = quorum_snapshot(LLMQType::Llmqtype50_60, 1);
        let (pipeline, _manager, _) = pipeline_over(snapshot);
        let mut lock = test_instant_lock(&quorum, 2);
        lock.signature = crate::crypto::BLSSignature::from([7; 96]);

        assert_matches!(pipeline.on_lock(lock.clone()), LockOutcome::Rejected(ValidationError::InvalidSignature(_)));
        assert_eq!(pipeline.status(&lock.txid), InstantSendStatus::None);
        assert_eq!(pipeline.tracked_transactions(), 0);
        assert_eq!(pipeline.progress().invalid(), 1);
    }

    #[test]
    fn test_rejected_claims_are_not_tracked() {
        let snapshot = masternode_snapshot(15);
        let modifier = BlockHash::from_byte_array([0x42; 32]);
        let quorum = lock_quorum(&snapshot, &modifier, 10);
        let outsider = snapshot
            .valid_masternodes()
            .find(|entry| !quorum.iter().any(|member| member.pro_reg_tx_hash == entry.pro_reg_tx_hash))
            .cloned()
            .unwrap();
        let (pipeline, _manager, _) = pipeline_over(snapshot.clone());
        let lock_quorum_entry = test_quorum(LLMQType::Llmqtype50_60, 1);

        for n in 1..=100u8 {
            let mut lock = test_instant_lock(&lock_quorum_entry, 1);
            lock.txid = Txid::from_byte_array([n; 32]);
            lock.inputs.clear();
            assert_matches!(pipeline.on_lock(lock), LockOutcome::Rejected(ValidationError::InvalidInstantLock(_)));
        }

        let txid = Txid::from_byte_array([0xee; 32]);
        let vote = VoteBuilder::new(txid, OutPoint::new(Txid::from_byte_array([0xef; 32]), 0), modifier)
            .signed_by(&outsider);
        assert_matches!(pipeline.on_vote(vote), LockOutcome::Rejected(ValidationError::MasternodeNotInQuorum { .. }));

        assert_eq!(pipeline.tracked_transactions(), 0);
        assert_eq!(pipeline.status(&txid), InstantSendStatus::None);
        assert_eq!(pipeline.progress().invalid(), 101);
    }

    #[test]
    fn test_rejected_claim_keeps_known_transaction() {
        let (snapshot, quorum) = quorum_snapshot(LLMQType::Llmqtype50_60, 1);
        let (pipeline, _manager, _) = pipeline_over(snapshot);
        let mut lock = test_instant_lock(&quorum, 1);
        pipeline.on_transaction(lock.txid, lock.inputs.clone());
        lock.signature = crate::crypto::BLSSignature::from([7; 96]);

        assert_matches!(pipeline.on_lock(lock.clone()), LockOutcome::Rejected(_));
        assert_eq!(pipeline.status(&lock.txid), InstantSendStatus::Requested);
        assert_eq!(pipeline.tracked_transactions(), 1);
    }

    #[test]
    fn test_lock_for_unknown_quorum_waits_for_diff() {
        let anchor = ListSnapshot::empty(BlockHash::from_byte_array([0xaa; 32]), 1000);
        let (pipeline, manager, headers) = pipeline_over(anchor);
        let quorum = test_quorum(LLMQType::Llmqtype50_60, 3);
        let lock = test_instant_lock(&quorum, 1);
        let txid = lock.txid;

        assert_eq!(pipeline.on_lock(lock), LockOutcome::Pending);
        assert_eq!(pipeline.status(&txid), InstantSendStatus::Processing);
        assert_eq!(pipeline.progress().pending(), 1);
        assert!(pipeline.retry_pending().iter().all(|(_, outcome)| *outcome == LockOutcome::Pending));

        let built = DiffBuilder::new(&manager.snapshot(), 1001).add_quorum(quorum).build();
        headers.insert(built.header);
        manager.apply_diff(built.diff).unwrap();

        let outcomes = pipeline.retry_pending();
        assert_eq!(outcomes, vec![(txid, LockOutcome::Finalized(FinalityPath::InstantLock))]);
        assert_eq!(pipeline.progress().pending(), 0);
        assert!(pipeline.retry_pending().is_empty());
    }

    #[test]
    fn test_forged_lock_does_not_evict_pending_lock() {
        let anchor = ListSnapshot::empty(BlockHash::from_byte_array([0xaa; 32]), 1000);
        let (pipeline, manager, headers) = pipeline_over(anchor);
        let quorum = test_quorum(LLMQType::Llmqtype50_60, 3);
        let genuine = test_instant_lock(&quorum, 2);
        let txid = genuine.txid;
        let mut forged = genuine.clone();
        forged.signature = crate::crypto::BLSSignature::from([7; 96]);

        // The forged copy arrives first, so it is checked first once the quorum is known.
        assert_eq!(pipeline.on_lock(forged.clone()), LockOutcome::Pending);
        assert_eq!(pipeline.on_lock(genuine.clone()), LockOutcome::Pending);
        assert_eq!(pipeline.on_lock(forged), LockOutcome::Pending);
        assert_eq!(pipeline.state(&txid).unwrap().pending_locks().len(), 2);
        assert_eq!(pipeline.progress().pending(), 1);

        let built = DiffBuilder::new(&manager.snapshot(), 1001).add_quorum(quorum).build();
        headers.insert(built.header);
        manager.apply_diff(built.diff).unwrap();

        assert_eq!(pipeline.retry_pending(), vec![(txid, LockOutcome::Finalized(FinalityPath::InstantLock))]);
        assert_eq!(pipeline.status(&txid), InstantSendStatus::Done);
        assert_eq!(pipeline.progress().invalid(), 1);
        assert_eq!(pipeline.progress().pending(), 0);
        assert!(pipeline.state(&txid).unwrap().pending_locks().is_empty());
    }

    #[test]
    fn test_transaction_inputs_filter_pending_locks() {
        let anchor = ListSnapshot::empty(BlockHash::from_byte_array([0xaa; 32]), 1000);
        let (pipeline, manager, headers) = pipeline_over(anchor);
        let quorum = test_quorum(LLMQType::Llmqtype50_60, 4);
        let genuine = test_instant_lock(&quorum, 2);
        let mut wrong_inputs = genuine.clone();
        wrong_inputs.inputs.truncate(1);
        wrong_inputs.signature = crate::crypto::BLSSignature::from([9; 96]);

        assert_eq!(pipeline.on_lock(wrong_inputs), LockOutcome::Pending);
        assert_eq!(pipeline.on_lock(genuine.clone()), LockOutcome::Pending);
        assert_eq!(pipeline.on_transaction(genuine.txid, genuine.inputs.clone()), LockOutcome::Pending);
        assert_eq!(pipeline.state(&genuine.txid).unwrap().pending_locks(), &[genuine.clone()]);
        assert_eq!(pipeline.progress().invalid(), 1);

        let built = DiffBuilder::new(&manager.snapshot(), 1001).add_quorum(quorum).build();
        headers.insert(built.header);
        manager.apply_diff(built.diff).unwrap();
        assert_eq!(
            pipeline.retry_pending(),
            vec![(genuine.txid, LockOutcome::Finalized(FinalityPath::InstantLock))]
        );
    }

    #[test]
    fn test_lock_inputs_checked_against_transaction() {
        let (snapshot, quorum) = quorum_snapshot(LLMQType::Llmqtype50_60, 1);
        let (pipeline, _manager, _) = pipeline_over(snapshot);
        let lock = test_instant_lock(&quorum, 2);

        assert_eq!(pipeline.on_transaction(lock.txid, lock.inputs[..1].to_vec()), LockOutcome::Pending);
        assert_matches!(pipeline.on_lock(lock.clone()), LockOutcome::Rejected(ValidationError::InvalidInstantLock(_)));
        assert!(!pipeline.is_instant(&lock.txid));
    }

    #[test]
    fn test_votes_finalize_after_threshold_on_every_input() {
        let snapshot = masternode_snapshot(20);
        let modifier = BlockHash::from_byte_array([0x42; 32]);
        let quorum: Vec<_> = lock_quorum(&snapshot, &modifier, 10).into_iter().cloned().collect();
        let (pipeline, _manager, _) = pipeline_over(snapshot);
        let mut events = pipeline.subscribe();

        let txid = Txid::from_byte_array([0x11; 32]);
        let inputs = vec![
            OutPoint::new(Txid::from_byte_array([0x21; 32]), 0),
            OutPoint::new(Txid::from_byte_array([0x22; 32]), 1),
        ];

        // Votes may arrive before the transaction.
        for member in &quorum[..6] {
            let vote = VoteBuilder::new(txid, inputs[0], modifier).signed_by(member);
            assert_eq!(pipeline.on_vote(vote), LockOutcome::Pending);
        }
        assert_eq!(pipeline.on_transaction(txid, inputs.clone()), LockOutcome::Pending);
        assert_eq!(pipeline.status(&txid), InstantSendStatus::Processing);

        for member in &quorum[..5] {
            let vote = VoteBuilder::new(txid, inputs[1], modifier).signed_by(member);
            assert_eq!(pipeline.on_vote(vote), LockOutcome::Pending);
        }
        // A repeated vote does not count twice.
        let repeat = VoteBuilder::new(txid, inputs[1], modifier).signed_by(&quorum[0]);
        assert_eq!(pipeline.on_vote(repeat), LockOutcome::Pending);

        let last = VoteBuilder::new(txid, inputs[1], modifier).signed_by(&quorum[5]);
        assert_eq!(pipeline.on_vote(last), LockOutcome::Finalized(FinalityPath::LockVotes));
        assert_eq!(pipeline.state(&txid).unwrap().path(), Some(FinalityPath::LockVotes));

        let late = VoteBuilder::new(txid, inputs[1], modifier).signed_by(&quorum[6]);
        assert_eq!(pipeline.on_vote(late), LockOutcome::AlreadyFinal);
        assert!(events.try_recv().is_some());
        assert!(events.try_recv().is_none());
    }

    #[test]
    fn test_vote_for_foreign_input_is_rejected() {
        let snapshot = masternode_snapshot(20);
        let modifier = BlockHash::from_byte_array([0x42; 32]);
        let member = lock_quorum(&snapshot, &modifier, 10)[0].clone();
        let (pipeline, _manager, _) = pipeline_over(snapshot);

        let txid = Txid::from_byte_array([0x11; 32]);
        pipeline.on_transaction(txid, vec![OutPoint::new(Txid::from_byte_array([0x21; 32]), 0)]);
        let vote = VoteBuilder::new(txid, OutPoint::new(Txid::from_byte_array([0x99; 32]), 0), modifier)
            .signed_by(&member);

        assert_matches!(pipeline.on_vote(vote), LockOutcome::Rejected(ValidationError::InvalidLockVote { .. }));
    }

    #[test]
    fn test_purge_and_shutdown() {
        let (snapshot, quorum) = quorum_snapshot(LLMQType::Llmqtype50_60, 1);
        let headers = Arc::new(MemoryHeaderStore::new());
        let manager = MasternodeListManager::new(
            snapshot,
            headers,
            Arc::new(MemoryMasternodeListSink::new()),
            CancellationToken::new(),
        );
        let shutdown = CancellationToken::new();
        let pipeline = InstantSendPipeline::new(
            manager.reader(),
            Arc::new(TestBls),
            LockVoteParams::default(),
            shutdown.clone(),
        );

        let lock = test_instant_lock(&quorum, 1);
        pipeline.on_lock(lock.clone());
        assert!(pipeline.purge(&lock.txid));
        assert!(!pipeline.purge(&lock.txid));
        assert_eq!(pipeline.status(&lock.txid), InstantSendStatus::None);

        shutdown.cancel();
        assert_eq!(pipeline.on_lock(lock.clone()), LockOutcome::ShuttingDown);
        assert_eq!(pipeline.tracked_transactions(), 0);
    }
}
