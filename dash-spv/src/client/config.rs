//! Configuration for the finality client.

use serde::{Deserialize, Serialize};

use crate::chain::DifficultyParams;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::network::constants::{self, DEFAULT_MAX_CONCURRENT_LOOKUPS};
use crate::types::Network;
use crate::validation::LockVoteParams;

/// Configuration for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub network: Network,

    /// Hostnames resolved for peer discovery. Defaults to the network's seeds.
    pub dns_seeds: Vec<String>,

    /// Upper bound on concurrent DNS lookups.
    pub max_concurrent_lookups: usize,

    /// Port published with every resolved peer address.
    pub peer_port: u16,

    /// Legacy InstantSend lock vote quorum.
    pub lock_votes: LockVoteParams,

    /// Replaces the network's difficulty parameters, e.g. for a devnet.
    #[serde(default)]
    pub difficulty: Option<DifficultyParams>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Network::Dash)
    }
}

impl Config {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            dns_seeds: constants::dns_seeds(network).iter().map(|seed| seed.to_string()).collect(),
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            peer_port: constants::default_port(network),
            lock_votes: LockVoteParams::default(),
            difficulty: None,
            logging: LoggingConfig::default(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(Network::Dash)
    }

    pub fn testnet() -> Self {
        Self::new(Network::Testnet)
    }

    pub fn with_dns_seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dns_seeds = seeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_concurrent_lookups(mut self, max: usize) -> Self {
        self.max_concurrent_lookups = max;
        self
    }

    pub fn with_peer_port(mut self, port: u16) -> Self {
        self.peer_port = port;
        self
    }

    pub fn with_lock_votes(mut self, quorum_size: usize, required_votes: usize) -> Self {
        self.lock_votes = LockVoteParams {
            quorum_size,
            required_votes,
        };
        self
    }

    pub fn with_difficulty_params(mut self, params: DifficultyParams) -> Self {
        self.difficulty = Some(params);
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// The override if one is set, otherwise the network's parameters.
    pub fn difficulty_params(&self) -> DifficultyParams {
        self.difficulty.unwrap_or_else(|| DifficultyParams::for_network(self.network))
    }

    /// Validate the configuration.
    ///
    /// An empty seed list is valid; peers are then only added explicitly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.lock_votes.validate()?;
        Ok(())
    }
}
