//! In-memory storage implementations.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::chain::Checkpoint;
use crate::error::{StorageError, StorageResult};
use crate::network::PeerAddress;
use crate::sml::{ListSnapshot, MasternodeListDiff};
use crate::storage::{HeaderKey, HeaderLookup, MasternodeListSink, PeerAddressStore};
use crate::types::{BlockHash, BlockHeader};

#[derive(Default)]
struct HeaderIndex {
    by_height: HashMap<u32, BlockHeader>,
    // Reverse index for O(1) lookups
    height_by_hash: HashMap<BlockHash, u32>,
    tip: Option<u32>,
}

/// In-memory header store, safe to share between the validator and the list manager.
#[derive(Default)]
pub struct MemoryHeaderStore {
    inner: RwLock<HeaderIndex>,
}

impl MemoryHeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a checkpoint header.
    pub fn with_checkpoint(checkpoint: &Checkpoint) -> Self {
        let store = Self::new();
        store.insert(checkpoint.header());
        store
    }

    /// Store an accepted header, replacing any header at the same height.
    pub fn insert(&self, header: BlockHeader) {
        let mut index = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = index.by_height.insert(header.height, header) {
            index.height_by_hash.remove(&previous.hash);
        }
        index.height_by_hash.insert(header.hash, header.height);
        if index.tip.is_none_or(|tip| header.height > tip) {
            index.tip = Some(header.height);
        }
    }

    pub fn extend(&self, headers: impl IntoIterator<Item = BlockHeader>) {
        for header in headers {
            self.insert(header);
        }
    }

    pub fn tip(&self) -> Option<BlockHeader> {
        let index = self.inner.read().unwrap_or_else(|e| e.into_inner());
        index.tip.and_then(|height| index.by_height.get(&height).copied())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).by_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HeaderLookup for MemoryHeaderStore {
    fn ancestor(&self, key: HeaderKey) -> Option<BlockHeader> {
        let index = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let height = match key {
            HeaderKey::Height(height) => height,
            HeaderKey::Hash(hash) => *index.height_by_hash.get(&hash)?,
        };
        index.by_height.get(&height).copied()
    }
}

/// Records every verified snapshot in memory.
#[derive(Default)]
pub struct MemoryMasternodeListSink {
    snapshots: RwLock<Vec<Arc<ListSnapshot>>>,
}

impl MemoryMasternodeListSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Arc<ListSnapshot>> {
        self.snapshots.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<Arc<ListSnapshot>> {
        self.snapshots.read().ok().and_then(|s| s.last().cloned())
    }
}

impl MasternodeListSink for MemoryMasternodeListSink {
    fn append(&self, _diff: &MasternodeListDiff, snapshot: &ListSnapshot) -> StorageResult<()> {
        let mut snapshots =
            self.snapshots.write().map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        if let Some(last) = snapshots.last() {
            if last.height() > snapshot.height() {
                return Err(StorageError::InconsistentState(format!(
                    "snapshot at height {} appended after height {}",
                    snapshot.height(),
                    last.height()
                )));
            }
        }
        snapshots.push(Arc::new(snapshot.clone()));
        Ok(())
    }
}

/// Address book kept in memory. Each published batch is recorded as well.
#[derive(Debug, Default)]
pub struct MemoryPeerAddressStore {
    addresses: BTreeSet<PeerAddress>,
    batches: Vec<Vec<PeerAddress>>,
}

impl MemoryPeerAddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> Vec<PeerAddress> {
        self.addresses.iter().copied().collect()
    }

    pub fn batches(&self) -> &[Vec<PeerAddress>] {
        &self.batches
    }
}

impl PeerAddressStore for MemoryPeerAddressStore {
    fn set_peer_addresses(&mut self, addresses: Vec<PeerAddress>) -> StorageResult<()> {
        self.addresses.extend(addresses.iter().copied());
        self.batches.push(addresses);
        Ok(())
    }
}
