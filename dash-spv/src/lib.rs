//! Validation and finality layer for Dash SPV wallets.
//!
//! This library decides whether downloaded data can be trusted without running
//! a full node:
//!
//! - Validate block header difficulty (DarkGravityWave, testnet minimum difficulty)
//! - Maintain the masternode and quorum lists from authenticated `mnlistdiff`s
//! - Treat transactions as final through InstantSend lock votes or ISLocks
//! - Resolve DNS seeds into peer addresses
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dash_spv_finality::{Config, DashFinalityClient, LoggingConfig};
//! # use dash_spv_finality::crypto::{BLSPublicKey, BLSSignature, BlsVerifier};
//! # struct Verifier;
//! # impl BlsVerifier for Verifier {
//! #     fn verify(&self, _: &BLSPublicKey, _: &[u8; 32], _: &BLSSignature) -> bool { false }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::testnet();
//!     let _logging = dash_spv_finality::init_logging(config.logging.clone())?;
//!
//!     let client = DashFinalityClient::builder(config)
//!         .with_verifier(Arc::new(Verifier))
//!         .build()?;
//!     client.discover_peers().await?;
//!
//!     let mut finality = client.subscribe();
//!     while let Ok(event) = finality.recv().await {
//!         println!("{}", event.description());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **`bls`**: BLS12-381 signature verification with `blsful`
//! - **`x11`**: parse wire headers and compute their X11 hash
//! - **`test-utils`**: deterministic fixtures for downstream tests

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod chain;
pub mod client;
pub mod consensus;
pub mod crypto;
pub mod ephemeral;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod merkle;
pub mod network;
pub mod pow;
pub mod sml;
pub mod storage;
pub mod sync;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use client::{Config, DashFinalityClient, DashFinalityClientBuilder};
pub use error::{
    ConfigError, ListError, LoggingError, LoggingResult, NetworkError, SpvError, StorageError, ValidationError,
};
pub use event_bus::{FinalityEvent, FinalityPath};
pub use logging::{init_console_logging, init_logging, LogFileConfig, LoggingConfig, LoggingGuard};
pub use tracing::level_filters::LevelFilter;
pub use types::{BlockHash, BlockHeader, Network, OutPoint, ProTxHash, QuorumHash, Txid};

pub use sml::{LLMQType, ListSnapshot, MasternodeListDiff};
pub use sync::{InstantSendStatus, LockOutcome};

// Re-export hash trait
pub use hashes::Hash;

/// Current version of the dash-spv-finality library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
