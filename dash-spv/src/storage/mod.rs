//! Storage boundaries consumed by the finality layer.
//!
//! Header history, persisted masternode list snapshots and the peer address
//! book are owned by the embedding wallet. This module defines the traits the
//! core reads and writes them through, together with in-memory backends.

pub mod memory;

use std::sync::Arc;

use crate::error::StorageResult;
use crate::network::PeerAddress;
use crate::sml::{ListSnapshot, MasternodeListDiff};
use crate::types::{BlockHash, BlockHeader};

pub use memory::{MemoryHeaderStore, MemoryMasternodeListSink, MemoryPeerAddressStore};

/// Key used to look up a header in the external chain index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKey {
    Height(u32),
    Hash(BlockHash),
}

impl From<u32> for HeaderKey {
    fn from(height: u32) -> Self {
        HeaderKey::Height(height)
    }
}

impl From<BlockHash> for HeaderKey {
    fn from(hash: BlockHash) -> Self {
        HeaderKey::Hash(hash)
    }
}

/// Read-only access to accepted block headers.
pub trait HeaderLookup {
    fn ancestor(&self, key: HeaderKey) -> Option<BlockHeader>;
}

impl<T: HeaderLookup + ?Sized> HeaderLookup for &T {
    fn ancestor(&self, key: HeaderKey) -> Option<BlockHeader> {
        (**self).ancestor(key)
    }
}

impl<T: HeaderLookup + ?Sized> HeaderLookup for Arc<T> {
    fn ancestor(&self, key: HeaderKey) -> Option<BlockHeader> {
        (**self).ancestor(key)
    }
}

/// Append-only sink for verified masternode list snapshots.
pub trait MasternodeListSink: Send + Sync {
    /// Persist `snapshot`, the result of applying `diff`.
    ///
    /// An error leaves the live snapshot unchanged.
    fn append(&self, diff: &MasternodeListDiff, snapshot: &ListSnapshot) -> StorageResult<()>;
}

/// Address book used by peer selection.
pub trait PeerAddressStore: Send + 'static {
    /// Add `addresses` to the known peer addresses.
    fn set_peer_addresses(&mut self, addresses: Vec<PeerAddress>) -> StorageResult<()>;
}
