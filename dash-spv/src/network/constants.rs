//! Network constants for peer address discovery

use crate::types::Network;

// DNS seeds for Dash mainnet
pub const MAINNET_DNS_SEEDS: &[&str] = &[
    "dnsseed.dash.org",
    // Note: dnsseed.dashdot.io and dnsseed.masternode.io are currently not resolving
];

// DNS seeds for Dash testnet
pub const TESTNET_DNS_SEEDS: &[&str] = &["testnet-seed.dashdot.io", "test.dnsseed.masternode.io"];

pub const MAINNET_PORT: u16 = 9999;
pub const TESTNET_PORT: u16 = 19999;

// Concurrent DNS lookups
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Default P2P port of `network`.
pub fn default_port(network: Network) -> u16 {
    match network {
        Network::Dash => MAINNET_PORT,
        Network::Testnet => TESTNET_PORT,
    }
}

/// DNS seed hostnames of `network`.
pub fn dns_seeds(network: Network) -> &'static [&'static str] {
    match network {
        Network::Dash => MAINNET_DNS_SEEDS,
        Network::Testnet => TESTNET_DNS_SEEDS,
    }
}
