use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddrV4};

use hashes::{sha256d, Hash};

use crate::chain::params::MAX_TARGET_BITS;
use crate::crypto::{BLSPublicKey, BLSSignature};
use crate::merkle::{merkle_root_from_hashes, PartialMerkleTree};
use crate::pow::CompactTarget;
use crate::sml::coinbase::PAYLOAD_VERSION_QUORUM_ROOT;
use crate::sml::{
    CoinbasePayload, CoinbaseTransaction, LLMQType, ListSnapshot, MasternodeEntry, MasternodeListDiff,
    QuorumEntry, QuorumKey, TxOut,
};
use crate::types::{
    BlockHash, BlockHeader, MerkleRootMasternodeList, MerkleRootQuorums, ProTxHash, PubkeyHash, QuorumHash,
    QuorumVVecHash, TxMerkleNode, Txid,
};

/// Masternodes in fixture snapshots that are banned.
const INVALID_MASTERNODES: u8 = 3;

/// Non-coinbase transactions in blocks built by [`DiffBuilder`].
const FILLER_TRANSACTIONS: u8 = 2;

fn tagged(tag: &str, parts: &[&[u8]]) -> sha256d::Hash {
    let mut preimage = tag.as_bytes().to_vec();
    for part in parts {
        preimage.extend_from_slice(part);
    }
    sha256d::Hash::hash(&preimage)
}

fn stretch<const N: usize>(tag: &str, parts: &[&[u8]]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut block = tagged(tag, parts);
    for chunk in out.chunks_mut(32) {
        chunk.copy_from_slice(&block.as_byte_array()[..chunk.len()]);
        block = sha256d::Hash::hash(block.as_byte_array());
    }
    out
}

/// A valid, confirmed masternode. Equal `n` gives equal entries.
pub fn test_masternode(n: u8) -> MasternodeEntry {
    MasternodeEntry {
        pro_reg_tx_hash: ProTxHash::from_raw_hash(tagged("protx", &[&[n]])),
        confirmed_hash: BlockHash::from_raw_hash(tagged("confirmed", &[&[n]])),
        service_address: SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, n), 9999),
        operator_public_key: BLSPublicKey::from(stretch::<48>("operator", &[&[n]])),
        key_id_voting: PubkeyHash::from_byte_array(stretch::<20>("voting", &[&[n]])),
        is_valid: true,
    }
}

/// A quorum commitment of `llmq_type`. Equal arguments give equal entries.
pub fn test_quorum(llmq_type: LLMQType, n: u8) -> QuorumEntry {
    let type_byte = [u8::from(llmq_type)];
    QuorumEntry {
        version: 1,
        llmq_type,
        quorum_hash: QuorumHash::from_raw_hash(tagged("quorum", &[&type_byte, &[n]])),
        quorum_index: None,
        signers: vec![true; 8],
        valid_members: vec![true, true, true, true, true, true, false, true],
        quorum_public_key: BLSPublicKey::from(stretch::<48>("quorum-key", &[&type_byte, &[n]])),
        quorum_vvec_hash: QuorumVVecHash::from_raw_hash(tagged("vvec", &[&type_byte, &[n]])),
        threshold_signature: BLSSignature::from(stretch::<96>("threshold", &[&type_byte, &[n]])),
        all_commitment_aggregated_signature: BLSSignature::from(stretch::<96>("aggregate", &[&type_byte, &[n]])),
    }
}

/// A list at height 1000 with `count` selectable masternodes and a few banned ones.
pub fn masternode_snapshot(count: u8) -> ListSnapshot {
    let mut masternodes: BTreeMap<ProTxHash, MasternodeEntry> =
        (1..=count).map(test_masternode).map(|entry| (entry.pro_reg_tx_hash, entry)).collect();
    for n in 0..INVALID_MASTERNODES {
        let mut banned = test_masternode(u8::MAX - n);
        banned.is_valid = false;
        masternodes.insert(banned.pro_reg_tx_hash, banned);
    }
    ListSnapshot::from_parts(BlockHash::from_byte_array([0xaa; 32]), 1000, masternodes, BTreeMap::new())
}

/// A list at height 1000 holding a single quorum, returned alongside it.
pub fn quorum_snapshot(llmq_type: LLMQType, n: u8) -> (ListSnapshot, QuorumEntry) {
    let quorum = test_quorum(llmq_type, n);
    let quorums = BTreeMap::from([(quorum.key(), quorum.clone())]);
    let snapshot =
        ListSnapshot::from_parts(BlockHash::from_byte_array([0xaa; 32]), 1000, BTreeMap::new(), quorums);
    (snapshot, quorum)
}

/// A diff that passes every commitment check, and the header of its block.
///
/// The header still has to be made known to the list manager's header lookup.
#[derive(Debug, Clone)]
pub struct BuiltDiff {
    pub diff: MasternodeListDiff,
    pub header: BlockHeader,
}

/// Builds a consistent `mnlistdiff` on top of a snapshot.
pub struct DiffBuilder {
    base_block_hash: BlockHash,
    base: ListSnapshot,
    height: u32,
    payload_version: u16,
    deleted_masternodes: Vec<ProTxHash>,
    added_masternodes: Vec<MasternodeEntry>,
    deleted_quorums: Vec<QuorumKey>,
    added_quorums: Vec<QuorumEntry>,
}

impl DiffBuilder {
    /// A diff from `base` to a new block at `height`.
    pub fn new(base: &ListSnapshot, height: u32) -> Self {
        Self {
            base_block_hash: base.block_hash(),
            base: base.clone(),
            height,
            payload_version: PAYLOAD_VERSION_QUORUM_ROOT,
            deleted_masternodes: Vec::new(),
            added_masternodes: Vec::new(),
            deleted_quorums: Vec::new(),
            added_quorums: Vec::new(),
        }
    }

    pub fn add_masternode(mut self, entry: MasternodeEntry) -> Self {
        self.added_masternodes.push(entry);
        self
    }

    pub fn delete_masternode(mut self, pro_tx_hash: ProTxHash) -> Self {
        self.deleted_masternodes.push(pro_tx_hash);
        self
    }

    pub fn add_quorum(mut self, entry: QuorumEntry) -> Self {
        self.added_quorums.push(entry);
        self
    }

    pub fn delete_quorum(mut self, key: QuorumKey) -> Self {
        self.deleted_quorums.push(key);
        self
    }

    /// Version of the coinbase payload; versions below 2 carry no quorum root.
    pub fn payload_version(mut self, version: u16) -> Self {
        self.payload_version = version;
        self
    }

    pub fn build(self) -> BuiltDiff {
        let mut diff = MasternodeListDiff {
            base_block_hash: self.base_block_hash,
            block_hash: BlockHash::all_zeros(),
            deleted_masternodes: self.deleted_masternodes,
            added_masternodes: self.added_masternodes,
            deleted_quorums: self.deleted_quorums,
            added_quorums: self.added_quorums,
            merkle_root_mn_list: MerkleRootMasternodeList::all_zeros(),
            merkle_root_quorum_list: MerkleRootQuorums::all_zeros(),
            coinbase_transaction: coinbase(self.height, self.payload_version),
            coinbase_merkle_proof: PartialMerkleTree {
                total_transactions: 0,
                hashes: Vec::new(),
                flags: Vec::new(),
            },
        };

        let next = self.base.apply(&diff, self.height);
        diff.merkle_root_mn_list = next.masternode_merkle_root();
        diff.merkle_root_quorum_list = next.quorum_merkle_root();
        let payload = &mut diff.coinbase_transaction.payload;
        payload.merkle_root_masternode_list = next.masternode_merkle_root();
        payload.merkle_root_quorums = next.quorum_merkle_root();

        let height_bytes = self.height.to_le_bytes();
        let mut txids = vec![diff.coinbase_transaction.txid()];
        txids.extend((0..FILLER_TRANSACTIONS).map(|i| Txid::from_raw_hash(tagged("filler", &[&height_bytes, &[i]]))));
        let mut matches = vec![false; txids.len()];
        matches[0] = true;

        diff.coinbase_merkle_proof = match PartialMerkleTree::from_txids(&txids, &matches) {
            Ok(proof) => proof,
            Err(e) => panic!("coinbase proof over {} transactions: {}", txids.len(), e),
        };
        let merkle_root = merkle_root_from_hashes(txids.iter().map(|txid| txid.to_raw_hash()))
            .map(TxMerkleNode::from_raw_hash)
            .unwrap_or_else(TxMerkleNode::all_zeros);

        let block_hash = BlockHash::from_raw_hash(tagged(
            "block",
            &[self.base_block_hash.as_byte_array(), &height_bytes, merkle_root.as_byte_array()],
        ));
        diff.block_hash = block_hash;

        let header = BlockHeader {
            hash: block_hash,
            prev_hash: self.base_block_hash,
            merkle_root,
            timestamp: 1_700_000_000 + self.height * 150,
            bits: CompactTarget::from_consensus(MAX_TARGET_BITS),
            height: self.height,
        };

        BuiltDiff {
            diff,
            header,
        }
    }
}

fn coinbase(height: u32, payload_version: u16) -> CoinbaseTransaction {
    let mut script_sig = vec![0x04];
    script_sig.extend_from_slice(&height.to_le_bytes());
    CoinbaseTransaction {
        version: 3,
        script_sig,
        sequence: u32::MAX,
        outputs: vec![TxOut {
            value: 500_000_000,
            script_pubkey: vec![0x76, 0xa9, 0x14],
        }],
        lock_time: 0,
        payload: CoinbasePayload {
            version: payload_version,
            height,
            merkle_root_masternode_list: MerkleRootMasternodeList::all_zeros(),
            merkle_root_quorums: MerkleRootQuorums::all_zeros(),
            chain_lock: None,
        },
    }
}
