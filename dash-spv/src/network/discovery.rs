//! DNS-based peer address discovery for the Dash network

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::error::{NetworkError, NetworkResult};
use crate::storage::PeerAddressStore;

/// An IPv4 peer address handed to peer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            ip,
            port,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Resolves a hostname to IP addresses.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn lookup_ip(&self, host: &str) -> NetworkResult<Vec<IpAddr>>;
}

/// [`HostResolver`] backed by the hickory DNS resolver, restricted to A records.
pub struct HickoryResolver {
    resolver: TokioResolver,
}

impl HickoryResolver {
    /// Create a resolver using the default upstream configuration.
    pub fn new() -> Self {
        let resolver = hickory_resolver::Resolver::builder_with_config(
            ResolverConfig::default(),
            TokioConnectionProvider::default(),
        )
        .with_options(Self::options())
        .build();

        Self {
            resolver,
        }
    }

    /// Create a resolver from the host's system DNS configuration.
    pub fn from_system_conf() -> NetworkResult<Self> {
        let resolver = hickory_resolver::Resolver::builder_tokio()
            .map_err(|e| NetworkError::ResolverInit(e.to_string()))?
            .with_options(Self::options())
            .build();

        Ok(Self {
            resolver,
        })
    }

    fn options() -> ResolverOpts {
        let mut opts = ResolverOpts::default();
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;
        opts
    }
}

impl Default for HickoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostResolver for HickoryResolver {
    async fn lookup_ip(&self, host: &str) -> NetworkResult<Vec<IpAddr>> {
        let lookup = self.resolver.lookup_ip(host).await.map_err(|e| NetworkError::DnsLookup {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        Ok(lookup.iter().collect())
    }
}

/// Peer address store shared between concurrent resolutions.
pub type SharedPeerAddressStore = Arc<Mutex<dyn PeerAddressStore>>;

/// Resolves seed hostnames concurrently and publishes their IPv4 addresses.
///
/// Lookups run in a bounded task group. A single aggregation loop receives the
/// results and publishes one batch per hostname while holding the store mutex,
/// so batches never interleave.
pub struct PeerAddressResolver {
    resolver: Arc<dyn HostResolver>,
    store: SharedPeerAddressStore,
    seeds: Vec<String>,
    default_port: u16,
    max_concurrent_lookups: usize,
    shutdown: CancellationToken,
}

impl PeerAddressResolver {
    pub fn new(
        resolver: Arc<dyn HostResolver>,
        store: SharedPeerAddressStore,
        seeds: Vec<String>,
        default_port: u16,
        max_concurrent_lookups: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            resolver,
            store,
            seeds,
            default_port,
            max_concurrent_lookups: max_concurrent_lookups.max(1),
            shutdown,
        }
    }

    /// Resolve the configured DNS seeds.
    pub fn resolve_seeds(&self) -> JoinHandle<usize> {
        self.resolve_and_publish(self.seeds.clone())
    }

    /// Resolve `hostnames` in the background.
    ///
    /// Failed lookups are logged and skipped. The handle yields the number of
    /// addresses published; cancelling the shutdown token aborts lookups still
    /// in flight.
    pub fn resolve_and_publish(&self, hostnames: Vec<String>) -> JoinHandle<usize> {
        let resolver = self.resolver.clone();
        let store = self.store.clone();
        let port = self.default_port;
        let shutdown = self.shutdown.clone();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_lookups));

        tokio::spawn(async move {
            let mut lookups = JoinSet::new();
            for host in hostnames {
                let resolver = resolver.clone();
                let semaphore = semaphore.clone();
                lookups.spawn(async move {
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => resolver.lookup_ip(&host).await,
                        Err(_) => Err(NetworkError::DnsLookup {
                            host: host.clone(),
                            reason: "lookup pool closed".to_string(),
                        }),
                    };
                    (host, result)
                });
            }

            let mut published = 0;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Aborting {} pending DNS lookups on shutdown", lookups.len());
                        lookups.abort_all();
                        break;
                    }
                    joined = lookups.join_next() => {
                        let Some(joined) = joined else {
                            break;
                        };
                        match joined {
                            Ok((host, Ok(ips))) => {
                                published += publish(&store, &host, ips, port).await;
                            }
                            Ok((host, Err(e))) => {
                                tracing::warn!("Failed to resolve DNS seed {}: {}", host, e);
                            }
                            Err(e) if e.is_cancelled() => {}
                            Err(e) => {
                                tracing::warn!("DNS lookup task failed: {}", e);
                            }
                        }
                    }
                }
            }

            tracing::info!("Published {} peer addresses from DNS seeds", published);
            published
        })
    }
}

async fn publish(store: &SharedPeerAddressStore, host: &str, ips: Vec<IpAddr>, port: u16) -> usize {
    let addresses: BTreeSet<PeerAddress> = ips
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) => Some(PeerAddress::new(v4, port)),
            IpAddr::V6(_) => None,
        })
        .collect();
    tracing::debug!("DNS seed {} returned {} IPv4 addresses", host, addresses.len());
    if addresses.is_empty() {
        return 0;
    }

    let count = addresses.len();
    let mut store = store.lock().await;
    match store.set_peer_addresses(addresses.into_iter().collect()) {
        Ok(()) => count,
        Err(e) => {
            tracing::warn!("Failed to store peer addresses from {}: {}", host, e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPeerAddressStore;
    use crate::test_utils::MockHostResolver;
    use std::net::Ipv6Addr;
    use std::time::Duration;

    fn resolver_with(
        mock: MockHostResolver,
        max_concurrent: usize,
    ) -> (PeerAddressResolver, Arc<Mutex<MemoryPeerAddressStore>>, CancellationToken) {
        let store = Arc::new(Mutex::new(MemoryPeerAddressStore::new()));
        let shutdown = CancellationToken::new();
        let resolver = PeerAddressResolver::new(
            Arc::new(mock),
            store.clone(),
            vec!["seed.one".to_string(), "seed.two".to_string()],
            9999,
            max_concurrent,
            shutdown.clone(),
        );
        (resolver, store, shutdown)
    }

    #[tokio::test]
    async fn test_publishes_ipv4_with_default_port() {
        let mock = MockHostResolver::new()
            .with_host(
                "seed.one",
                vec![
                    IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)),
                    IpAddr::V6(Ipv6Addr::LOCALHOST),
                    IpAddr::V4(Ipv4Addr::new(5, 6, 7, 8)),
                ],
            )
            .with_host("seed.two", vec![IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))]);
        let (resolver, store, _shutdown) = resolver_with(mock, 2);

        let published = resolver.resolve_seeds().await.unwrap();
        assert_eq!(published, 3);

        let store = store.lock().await;
        let addresses = store.addresses();
        assert_eq!(addresses.len(), 2);
        assert!(addresses.iter().all(|a| a.port == 9999));
        assert!(addresses.contains(&PeerAddress::new(Ipv4Addr::new(5, 6, 7, 8), 9999)));
    }

    #[tokio::test]
    async fn test_failed_host_is_skipped() {
        let mock = MockHostResolver::new()
            .with_host("seed.one", vec![IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9))])
            .with_failure("seed.two");
        let (resolver, store, _shutdown) = resolver_with(mock, 4);

        let published = resolver.resolve_seeds().await.unwrap();
        assert_eq!(published, 1);
        assert_eq!(store.lock().await.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_pending_lookups() {
        let mock = MockHostResolver::new().with_hanging("seed.one").with_hanging("seed.two");
        let (resolver, store, shutdown) = resolver_with(mock, 2);

        let handle = resolver.resolve_seeds();
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        let published = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert_eq!(published, 0);
        assert!(store.lock().await.addresses().is_empty());
    }

    #[test]
    fn test_peer_address_display() {
        let address = PeerAddress::new(Ipv4Addr::new(127, 0, 0, 1), 19999);
        assert_eq!(address.to_string(), "127.0.0.1:19999");
        assert_eq!(address.socket_addr().port(), 19999);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_hickory_resolves_mainnet_seed() {
        let resolver = HickoryResolver::new();
        let ips = resolver.lookup_ip(crate::network::constants::MAINNET_DNS_SEEDS[0]).await.unwrap();
        assert!(!ips.is_empty());
        assert!(ips.iter().all(|ip| ip.is_ipv4()));
    }
}
