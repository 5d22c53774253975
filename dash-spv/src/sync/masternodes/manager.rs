//! Masternode list manager.
//!
//! Applies `mnlistdiff` messages on top of the live list. A diff is only
//! accepted when its base is the live list's block, when the recomputed merkle
//! roots match the roots it claims, and when those roots are committed to by the
//! coinbase of the claimed block. Accepted snapshots are persisted before they
//! become visible to readers.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;

use crate::error::{ListError, ListResult};
use crate::sml::{ListSnapshot, MasternodeListDiff};
use crate::storage::{HeaderKey, HeaderLookup, MasternodeListSink};
use crate::sync::masternodes::MasternodesProgress;
use crate::types::BlockHeader;

type SharedSnapshot = Arc<RwLock<Arc<ListSnapshot>>>;

/// Cheap, cloneable read handle on the live masternode list.
#[derive(Clone)]
pub struct ListReader {
    current: SharedSnapshot,
}

impl ListReader {
    /// The live snapshot. Holding it never blocks the writer.
    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Owns the live masternode/quorum list and the single writer path to it.
pub struct MasternodeListManager {
    current: SharedSnapshot,
    /// Held for the whole of a diff application; serializes writers.
    writer: Mutex<MasternodesProgress>,
    headers: Arc<dyn HeaderLookup + Send + Sync>,
    sink: Arc<dyn MasternodeListSink>,
    shutdown: CancellationToken,
}

impl MasternodeListManager {
    /// Create a manager anchored at `anchor`, usually
    /// `ListSnapshot::empty(checkpoint_hash, checkpoint_height)` or a restored snapshot.
    pub fn new(
        anchor: ListSnapshot,
        headers: Arc<dyn HeaderLookup + Send + Sync>,
        sink: Arc<dyn MasternodeListSink>,
        shutdown: CancellationToken,
    ) -> Self {
        tracing::info!(
            "Masternode list anchored at {} (height {}, {} masternodes, {} quorums)",
            anchor.block_hash(),
            anchor.height(),
            anchor.masternode_count(),
            anchor.quorum_count()
        );
        let progress = MasternodesProgress::new(anchor.height());
        Self {
            current: Arc::new(RwLock::new(Arc::new(anchor))),
            writer: Mutex::new(progress),
            headers,
            sink,
            shutdown,
        }
    }

    pub fn reader(&self) -> ListReader {
        ListReader {
            current: self.current.clone(),
        }
    }

    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn progress(&self) -> MasternodesProgress {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Verify `diff` and make the resulting list live.
    ///
    /// On any error the live snapshot is left untouched.
    pub fn apply_diff(&self, diff: MasternodeListDiff) -> ListResult<Arc<ListSnapshot>> {
        if self.shutdown.is_cancelled() {
            return Err(ListError::ShuttingDown);
        }

        let mut progress = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shutdown.is_cancelled() {
            return Err(ListError::ShuttingDown);
        }

        match self.verify_and_apply(&diff) {
            Ok(snapshot) => {
                progress.record_applied(snapshot.height());
                tracing::info!(
                    "Applied mnlistdiff {} -> {} at height {}: {} masternodes, {} quorums",
                    diff.base_block_hash,
                    snapshot.block_hash(),
                    snapshot.height(),
                    snapshot.masternode_count(),
                    snapshot.quorum_count()
                );
                Ok(snapshot)
            }
            Err(e) => {
                progress.record_rejected();
                tracing::warn!("Rejected mnlistdiff for block {} ({}): {}", diff.block_hash, e.category(), e);
                Err(e)
            }
        }
    }

    fn verify_and_apply(&self, diff: &MasternodeListDiff) -> ListResult<Arc<ListSnapshot>> {
        let current = self.snapshot();
        if diff.base_block_hash != current.block_hash() {
            return Err(ListError::BaseMismatch {
                expected: current.block_hash(),
                found: diff.base_block_hash,
            });
        }

        // The claimed block provides the new list's height and the merkle root
        // the coinbase proof must reach.
        let header =
            self.headers.ancestor(HeaderKey::Hash(diff.block_hash)).ok_or(ListError::UnknownBlock(diff.block_hash))?;

        let next = current.apply(diff, header.height);

        if next.masternode_merkle_root() != diff.merkle_root_mn_list {
            return Err(ListError::MerkleMismatch {
                list: "masternode",
                computed: next.masternode_merkle_root().to_string(),
                claimed: diff.merkle_root_mn_list.to_string(),
            });
        }
        if next.quorum_merkle_root() != diff.merkle_root_quorum_list {
            return Err(ListError::MerkleMismatch {
                list: "quorum",
                computed: next.quorum_merkle_root().to_string(),
                claimed: diff.merkle_root_quorum_list.to_string(),
            });
        }

        verify_coinbase_commitment(diff, &next, &header)?;

        self.sink.append(diff, &next)?;

        let next = Arc::new(next);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        Ok(next)
    }
}

/// Check that the coinbase of `header` commits to the lists in `next` and is
/// proven to be the block's first transaction.
fn verify_coinbase_commitment(diff: &MasternodeListDiff, next: &ListSnapshot, header: &BlockHeader) -> ListResult<()> {
    let coinbase = &diff.coinbase_transaction;
    let payload = &coinbase.payload;

    if payload.merkle_root_masternode_list != next.masternode_merkle_root() {
        return Err(ListError::CoinbaseCommitmentMismatch(format!(
            "coinbase masternode root {} differs from list root {}",
            payload.merkle_root_masternode_list,
            next.masternode_merkle_root()
        )));
    }

    if payload.has_quorum_root() {
        if payload.merkle_root_quorums != next.quorum_merkle_root() {
            return Err(ListError::CoinbaseCommitmentMismatch(format!(
                "coinbase quorum root {} differs from list root {}",
                payload.merkle_root_quorums,
                next.quorum_merkle_root()
            )));
        }
    } else if next.quorum_count() > 0 {
        return Err(ListError::CoinbaseCommitmentMismatch(format!(
            "payload version {} commits to no quorums but the list has {}",
            payload.version,
            next.quorum_count()
        )));
    }

    if payload.height != header.height {
        return Err(ListError::CoinbaseCommitmentMismatch(format!(
            "coinbase height {} differs from block height {}",
            payload.height, header.height
        )));
    }

    let (root, matches) = diff
        .coinbase_merkle_proof
        .extract_matches()
        .map_err(|e| ListError::CoinbaseCommitmentMismatch(format!("malformed coinbase proof: {}", e)))?;

    let txid = coinbase.txid();
    if matches.as_slice() != [(0, txid)] {
        return Err(ListError::CoinbaseCommitmentMismatch(format!(
            "proof does not place coinbase {} at position 0",
            txid
        )));
    }

    if root != header.merkle_root {
        return Err(ListError::CoinbaseCommitmentMismatch(format!(
            "proof root {} differs from block {} merkle root {}",
            root, header.hash, header.merkle_root
        )));
    }

    Ok(())
}
