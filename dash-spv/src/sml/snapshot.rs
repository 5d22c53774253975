use std::collections::BTreeMap;

use hashes::Hash;

use crate::merkle::merkle_root;
use crate::sml::diff::MasternodeListDiff;
use crate::sml::llmq_type::LLMQType;
use crate::sml::masternode_entry::MasternodeEntry;
use crate::sml::quorum_entry::{QuorumEntry, QuorumKey};
use crate::types::{BlockHash, MerkleRootMasternodeList, MerkleRootQuorums, ProTxHash, QuorumHash};

/// An immutable view of the masternode and quorum lists at one block.
///
/// Snapshots are shared as `Arc<ListSnapshot>` and never mutated; applying a
/// diff produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    block_hash: BlockHash,
    height: u32,
    masternodes: BTreeMap<ProTxHash, MasternodeEntry>,
    quorums: BTreeMap<QuorumKey, QuorumEntry>,
    masternode_merkle_root: MerkleRootMasternodeList,
    quorum_merkle_root: MerkleRootQuorums,
}

impl ListSnapshot {
    /// An empty list anchored at a checkpoint.
    pub fn empty(block_hash: BlockHash, height: u32) -> Self {
        Self::from_parts(block_hash, height, BTreeMap::new(), BTreeMap::new())
    }

    /// Build a snapshot from restored lists, computing its merkle roots.
    pub fn from_parts(
        block_hash: BlockHash,
        height: u32,
        masternodes: BTreeMap<ProTxHash, MasternodeEntry>,
        quorums: BTreeMap<QuorumKey, QuorumEntry>,
    ) -> Self {
        let masternode_merkle_root = Self::masternode_root_of(&masternodes);
        let quorum_merkle_root = Self::quorum_root_of(&quorums);
        Self {
            block_hash,
            height,
            masternodes,
            quorums,
            masternode_merkle_root,
            quorum_merkle_root,
        }
    }

    /// The snapshot obtained by applying `diff` on top of this one.
    ///
    /// Deletions are applied before additions. Neither the base check nor the
    /// commitment checks happen here.
    pub fn apply(&self, diff: &MasternodeListDiff, height: u32) -> Self {
        let mut masternodes = self.masternodes.clone();
        for pro_tx_hash in &diff.deleted_masternodes {
            masternodes.remove(pro_tx_hash);
        }
        for entry in &diff.added_masternodes {
            masternodes.insert(entry.pro_reg_tx_hash, entry.clone());
        }

        let mut quorums = self.quorums.clone();
        for key in &diff.deleted_quorums {
            quorums.remove(key);
        }
        for entry in &diff.added_quorums {
            quorums.insert(entry.key(), entry.clone());
        }

        Self::from_parts(diff.block_hash, height, masternodes, quorums)
    }

    fn masternode_root_of(masternodes: &BTreeMap<ProTxHash, MasternodeEntry>) -> MerkleRootMasternodeList {
        let root = merkle_root(masternodes.values(), &|entry: &MasternodeEntry| entry.entry_hash());
        MerkleRootMasternodeList::from_raw_hash(root)
    }

    fn quorum_root_of(quorums: &BTreeMap<QuorumKey, QuorumEntry>) -> MerkleRootQuorums {
        let root = merkle_root(quorums.values(), &|entry: &QuorumEntry| entry.entry_hash());
        MerkleRootQuorums::from_raw_hash(root)
    }

    pub fn block_hash(&self) -> BlockHash {
        self.block_hash
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn masternode_merkle_root(&self) -> MerkleRootMasternodeList {
        self.masternode_merkle_root
    }

    pub fn quorum_merkle_root(&self) -> MerkleRootQuorums {
        self.quorum_merkle_root
    }

    pub fn masternode(&self, pro_tx_hash: &ProTxHash) -> Option<&MasternodeEntry> {
        self.masternodes.get(pro_tx_hash)
    }

    /// Masternodes in merkle leaf order.
    pub fn masternodes(&self) -> impl Iterator<Item = &MasternodeEntry> {
        self.masternodes.values()
    }

    pub fn valid_masternodes(&self) -> impl Iterator<Item = &MasternodeEntry> {
        self.masternodes.values().filter(|entry| entry.is_valid)
    }

    pub fn masternode_count(&self) -> usize {
        self.masternodes.len()
    }

    pub fn quorum(&self, llmq_type: LLMQType, quorum_hash: &QuorumHash) -> Option<&QuorumEntry> {
        self.quorums.get(&QuorumKey::new(llmq_type, *quorum_hash))
    }

    /// Quorums in merkle leaf order.
    pub fn quorums(&self) -> impl Iterator<Item = &QuorumEntry> {
        self.quorums.values()
    }

    pub fn quorums_of_type(&self, llmq_type: LLMQType) -> impl Iterator<Item = &QuorumEntry> {
        self.quorums.values().filter(move |entry| entry.llmq_type == llmq_type)
    }

    pub fn quorum_count(&self) -> usize {
        self.quorums.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_masternode, test_quorum, DiffBuilder};

    #[test]
    fn test_empty_snapshot_has_zero_roots() {
        let snapshot = ListSnapshot::empty(BlockHash::all_zeros(), 0);
        assert_eq!(snapshot.masternode_merkle_root(), MerkleRootMasternodeList::all_zeros());
        assert_eq!(snapshot.quorum_merkle_root(), MerkleRootQuorums::all_zeros());
    }

    #[test]
    fn test_apply_deletes_before_adding() {
        let base = ListSnapshot::empty(BlockHash::all_zeros(), 0);
        let first = DiffBuilder::new(&base, 10)
            .add_masternode(test_masternode(1))
            .add_masternode(test_masternode(2))
            .add_quorum(test_quorum(LLMQType::Llmqtype50_60, 1))
            .build();
        let snapshot = base.apply(&first.diff, 10);
        assert_eq!(snapshot.masternode_count(), 2);
        assert_eq!(snapshot.quorum_count(), 1);

        // Re-adding a deleted masternode in the same diff keeps it.
        let replaced = test_masternode(1);
        let second = DiffBuilder::new(&snapshot, 11)
            .delete_masternode(replaced.pro_reg_tx_hash)
            .add_masternode(replaced.clone())
            .delete_masternode(test_masternode(2).pro_reg_tx_hash)
            .build();
        let next = snapshot.apply(&second.diff, 11);
        assert_eq!(next.masternode_count(), 1);
        assert!(next.masternode(&replaced.pro_reg_tx_hash).is_some());

        // The earlier snapshot is untouched.
        assert_eq!(snapshot.masternode_count(), 2);
    }

    #[test]
    fn test_roots_do_not_depend_on_insertion_order() {
        let base = ListSnapshot::empty(BlockHash::all_zeros(), 0);
        let forward = DiffBuilder::new(&base, 5)
            .add_masternode(test_masternode(1))
            .add_masternode(test_masternode(2))
            .add_masternode(test_masternode(3))
            .build();
        let backward = DiffBuilder::new(&base, 5)
            .add_masternode(test_masternode(3))
            .add_masternode(test_masternode(2))
            .add_masternode(test_masternode(1))
            .build();
        assert_eq!(
            base.apply(&forward.diff, 5).masternode_merkle_root(),
            base.apply(&backward.diff, 5).masternode_merkle_root()
        );
    }

    #[test]
    fn test_quorums_of_type() {
        let base = ListSnapshot::empty(BlockHash::all_zeros(), 0);
        let diff = DiffBuilder::new(&base, 5)
            .add_quorum(test_quorum(LLMQType::Llmqtype50_60, 1))
            .add_quorum(test_quorum(LLMQType::Llmqtype400_60, 2))
            .build();
        let snapshot = base.apply(&diff.diff, 5);
        assert_eq!(snapshot.quorums_of_type(LLMQType::Llmqtype50_60).count(), 1);
        let quorum = test_quorum(LLMQType::Llmqtype400_60, 2);
        assert!(snapshot.quorum(LLMQType::Llmqtype400_60, &quorum.quorum_hash).is_some());
    }
}
