//! High-level facade wiring the finality components for one network.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dash_spv_finality::{Config, DashFinalityClient};
//! # use dash_spv_finality::crypto::{BLSPublicKey, BLSSignature, BlsVerifier};
//! # struct Verifier;
//! # impl BlsVerifier for Verifier {
//! #     fn verify(&self, _: &BLSPublicKey, _: &[u8; 32], _: &BLSSignature) -> bool { false }
//! # }
//!
//! # async fn run() -> Result<(), dash_spv_finality::SpvError> {
//! let client = DashFinalityClient::builder(Config::testnet())
//!     .with_verifier(Arc::new(Verifier))
//!     .build()?;
//! let mut finality = client.subscribe();
//! let discovered = client.discover_peers().await.unwrap_or(0);
//! # Ok(())
//! # }
//! ```

pub mod config;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::chain::Checkpoint;
use crate::crypto::BlsVerifier;
use crate::ephemeral::{InstantLock, TransactionLockVote};
use crate::error::{Result, SpvError};
use crate::event_bus::{EventReceiver, FinalityEvent};
use crate::network::discovery::SharedPeerAddressStore;
use crate::network::{HickoryResolver, HostResolver, PeerAddressResolver};
use crate::sml::{ListSnapshot, MasternodeListDiff};
use crate::storage::{
    HeaderLookup, MasternodeListSink, MemoryHeaderStore, MemoryMasternodeListSink, MemoryPeerAddressStore,
};
use crate::sync::{InstantSendPipeline, InstantSendStatus, ListReader, LockOutcome, MasternodeListManager};
use crate::types::{BlockHeader, OutPoint, Txid};
use crate::validation::DifficultyValidatorChain;

pub use config::Config;

/// Validation and finality core for one network.
pub struct DashFinalityClient {
    config: Config,
    headers: Arc<dyn HeaderLookup + Send + Sync>,
    difficulty: DifficultyValidatorChain,
    masternodes: MasternodeListManager,
    instantsend: InstantSendPipeline,
    peers: PeerAddressResolver,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for DashFinalityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashFinalityClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl DashFinalityClient {
    pub fn builder(config: Config) -> DashFinalityClientBuilder {
        DashFinalityClientBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check `header` against proof of work and the difficulty retarget rules.
    pub fn validate_header(&self, header: &BlockHeader) -> Result<()> {
        self.difficulty.validate(header, &self.headers)?;
        Ok(())
    }

    /// Validate a contiguous batch whose first header extends the known chain.
    pub fn validate_headers(&self, headers: &[BlockHeader]) -> Result<()> {
        self.difficulty.validate_batch(headers, &self.headers)?;
        Ok(())
    }

    /// Apply a masternode list diff, then retry locks that were waiting for a quorum.
    pub fn apply_diff(&self, diff: MasternodeListDiff) -> Result<Arc<ListSnapshot>> {
        let snapshot = self.masternodes.apply_diff(diff)?;
        let retried = self.instantsend.retry_pending();
        let finalized = retried.iter().filter(|(_, outcome)| matches!(outcome, LockOutcome::Finalized(_))).count();
        if finalized > 0 {
            tracing::info!("{} pending InstantLocks finalized at list height {}", finalized, snapshot.height());
        }
        Ok(snapshot)
    }

    pub fn masternode_list(&self) -> Arc<ListSnapshot> {
        self.masternodes.snapshot()
    }

    pub fn list_reader(&self) -> ListReader {
        self.masternodes.reader()
    }

    pub fn masternode_manager(&self) -> &MasternodeListManager {
        &self.masternodes
    }

    pub fn instantsend(&self) -> &InstantSendPipeline {
        &self.instantsend
    }

    pub fn on_transaction(&self, txid: Txid, inputs: Vec<OutPoint>) -> LockOutcome {
        self.instantsend.on_transaction(txid, inputs)
    }

    pub fn on_vote(&self, vote: TransactionLockVote) -> LockOutcome {
        self.instantsend.on_vote(vote)
    }

    pub fn on_lock(&self, lock: InstantLock) -> LockOutcome {
        self.instantsend.on_lock(lock)
    }

    pub fn status(&self, txid: &Txid) -> InstantSendStatus {
        self.instantsend.status(txid)
    }

    pub fn is_instant(&self, txid: &Txid) -> bool {
        self.instantsend.is_instant(txid)
    }

    pub fn purge(&self, txid: &Txid) -> bool {
        self.instantsend.purge(txid)
    }

    pub fn subscribe(&self) -> EventReceiver<FinalityEvent> {
        self.instantsend.subscribe()
    }

    /// Resolve the configured DNS seeds in the background.
    pub fn discover_peers(&self) -> JoinHandle<usize> {
        self.peers.resolve_seeds()
    }

    /// Resolve additional hostnames in the background.
    pub fn add_peers(&self, hostnames: Vec<String>) -> JoinHandle<usize> {
        self.peers.resolve_and_publish(hostnames)
    }

    /// Stop accepting work. In-flight diff applications and lock checks finish;
    /// outstanding DNS lookups are aborted.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("Shutting down {} finality client", self.config.network);
        }
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Assembles a [`DashFinalityClient`]. Components not supplied default to the
/// in-memory backends anchored at the network's genesis block.
pub struct DashFinalityClientBuilder {
    config: Config,
    headers: Option<Arc<dyn HeaderLookup + Send + Sync>>,
    anchor: Option<ListSnapshot>,
    list_sink: Option<Arc<dyn MasternodeListSink>>,
    peer_store: Option<SharedPeerAddressStore>,
    verifier: Option<Arc<dyn BlsVerifier>>,
    host_resolver: Option<Arc<dyn HostResolver>>,
    shutdown: Option<CancellationToken>,
}

impl DashFinalityClientBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            headers: None,
            anchor: None,
            list_sink: None,
            peer_store: None,
            verifier: None,
            host_resolver: None,
            shutdown: None,
        }
    }

    pub fn with_header_lookup(mut self, headers: Arc<dyn HeaderLookup + Send + Sync>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Start the masternode list from a checkpoint or a restored snapshot.
    pub fn with_anchor(mut self, anchor: ListSnapshot) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_list_sink(mut self, sink: Arc<dyn MasternodeListSink>) -> Self {
        self.list_sink = Some(sink);
        self
    }

    pub fn with_peer_store(mut self, store: SharedPeerAddressStore) -> Self {
        self.peer_store = Some(store);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn BlsVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = Some(resolver);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn build(self) -> Result<DashFinalityClient> {
        self.config.validate().map_err(SpvError::Config)?;

        let config = self.config;
        let genesis = Checkpoint::genesis(config.network);
        let shutdown = self.shutdown.unwrap_or_default();

        let verifier = match self.verifier {
            Some(verifier) => verifier,
            None => default_verifier()?,
        };
        let headers = self.headers.unwrap_or_else(|| Arc::new(MemoryHeaderStore::with_checkpoint(&genesis)));
        let anchor = self.anchor.unwrap_or_else(|| ListSnapshot::empty(genesis.block_hash, genesis.height));
        let list_sink = self.list_sink.unwrap_or_else(|| Arc::new(MemoryMasternodeListSink::new()));
        let peer_store = self.peer_store.unwrap_or_else(|| Arc::new(Mutex::new(MemoryPeerAddressStore::new())));
        let host_resolver = self.host_resolver.unwrap_or_else(|| Arc::new(HickoryResolver::new()));

        let difficulty = DifficultyValidatorChain::for_network(config.network).with_params(config.difficulty_params());
        let masternodes = MasternodeListManager::new(anchor, headers.clone(), list_sink, shutdown.clone());
        let instantsend =
            InstantSendPipeline::new(masternodes.reader(), verifier, config.lock_votes, shutdown.clone());
        let peers = PeerAddressResolver::new(
            host_resolver,
            peer_store,
            config.dns_seeds.clone(),
            config.peer_port,
            config.max_concurrent_lookups,
            shutdown.clone(),
        );

        tracing::info!(
            "Finality client ready for {} ({} DNS seeds, lock votes {}/{})",
            config.network,
            config.dns_seeds.len(),
            config.lock_votes.required_votes,
            config.lock_votes.quorum_size
        );

        Ok(DashFinalityClient {
            config,
            headers,
            difficulty,
            masternodes,
            instantsend,
            peers,
            shutdown,
        })
    }
}

#[cfg(feature = "bls")]
fn default_verifier() -> Result<Arc<dyn BlsVerifier>> {
    Ok(Arc::new(crate::crypto::BlsfulVerifier))
}

#[cfg(not(feature = "bls"))]
fn default_verifier() -> Result<Arc<dyn BlsVerifier>> {
    Err(SpvError::Config(crate::error::ConfigError::MissingComponent("BLS verifier")))
}
