//! Error types for the Dash SPV finality layer.

use std::io;
use thiserror::Error;

use crate::pow::CompactTarget;
use crate::sml::llmq_type::LLMQType;
use crate::types::{BlockHash, OutPoint, ProTxHash, QuorumHash, Txid};

/// Main error type for the finality layer.
#[derive(Debug, Error)]
pub enum SpvError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Masternode list error: {0}")]
    List(#[from] ListError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Shutting down")]
    ShuttingDown,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid network name: {0}")]
    InvalidNetwork(String),

    #[error("Invalid difficulty parameters: {0}")]
    InvalidDifficultyParams(String),

    #[error("Invalid lock vote parameters: required {required} votes out of a quorum of {quorum_size}")]
    InvalidLockVoteParams {
        quorum_size: usize,
        required: usize,
    },

    #[error("max_concurrent_lookups must be greater than zero")]
    ZeroConcurrency,

    #[error("No {0} configured")]
    MissingComponent(&'static str),
}

/// Logging-related errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),

    #[error("Log rotation failed: {0}")]
    RotationFailed(String),
}

/// Network-related errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("DNS lookup for {host} failed: {reason}")]
    DnsLookup {
        host: String,
        reason: String,
    },

    #[error("Failed to initialize DNS resolver: {0}")]
    ResolverInit(String),
}

/// Storage-related errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Data not found: {0}")]
    NotFound(String),

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Header, vote and lock validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid proof of work for block {0}")]
    BadProofOfWork(BlockHash),

    #[error("Bad difficulty bits at height {height}: expected {expected}, found {found}")]
    BadDifficultyBits {
        height: u32,
        expected: CompactTarget,
        found: CompactTarget,
    },

    #[error("Invalid compact target {0}")]
    InvalidCompactTarget(CompactTarget),

    #[error("Missing ancestor {0}")]
    MissingAncestor(String),

    #[error("Invalid header chain: {0}")]
    InvalidHeaderChain(String),

    #[error("Invalid InstantLock: {0}")]
    InvalidInstantLock(String),

    #[error("Invalid lock vote for {outpoint}: {reason}")]
    InvalidLockVote {
        outpoint: OutPoint,
        reason: String,
    },

    #[error("Masternode {0} not found in the current list")]
    MasternodeNotFound(ProTxHash),

    #[error("Masternode {pro_tx_hash} is not in the lock quorum for {txid}")]
    MasternodeNotInQuorum {
        pro_tx_hash: ProTxHash,
        txid: Txid,
    },

    #[error("Quorum {quorum_hash} of type {llmq_type} not found")]
    QuorumNotFound {
        llmq_type: LLMQType,
        quorum_hash: QuorumHash,
    },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// Masternode / quorum list diff application errors.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Diff base {found} does not match current list block {expected}")]
    BaseMismatch {
        expected: BlockHash,
        found: BlockHash,
    },

    #[error("{list} merkle root mismatch: computed {computed}, claimed {claimed}")]
    MerkleMismatch {
        list: &'static str,
        computed: String,
        claimed: String,
    },

    #[error("Coinbase commitment mismatch: {0}")]
    CoinbaseCommitmentMismatch(String),

    #[error("Unknown block {0}")]
    UnknownBlock(BlockHash),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Shutting down")]
    ShuttingDown,
}

impl ListError {
    /// Returns a static string naming the error category.
    pub fn category(&self) -> &'static str {
        match self {
            ListError::BaseMismatch {
                ..
            } => "ordering",
            ListError::MerkleMismatch {
                ..
            }
            | ListError::CoinbaseCommitmentMismatch(_) => "commitment",
            ListError::UnknownBlock(_) => "dependency",
            ListError::Storage(_) => "storage",
            ListError::ShuttingDown => "shutdown",
        }
    }
}

/// Type alias for Result with SpvError.
pub type Result<T> = std::result::Result<T, SpvError>;

/// Type alias for network operation results.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

/// Type alias for storage operation results.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Type alias for validation operation results.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Type alias for list diff application results.
pub type ListResult<T> = std::result::Result<T, ListError>;

/// Type alias for logging operation results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;
