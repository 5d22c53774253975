//! Shared setup for the integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use dash_spv_finality::storage::{
    MemoryHeaderStore, MemoryMasternodeListSink, MemoryPeerAddressStore, PeerAddressStore,
};
use dash_spv_finality::test_utils::{DiffBuilder, MockHostResolver, TestBls};
use dash_spv_finality::{Config, DashFinalityClient, ListSnapshot};
use tokio::sync::Mutex;

/// A client wired to in-memory backends the test can inspect.
pub struct TestClient {
    pub client: DashFinalityClient,
    pub headers: Arc<MemoryHeaderStore>,
    pub sink: Arc<MemoryMasternodeListSink>,
    pub peers: Arc<Mutex<MemoryPeerAddressStore>>,
}

impl TestClient {
    /// Apply a diff built on top of the live list, registering its block first.
    pub fn apply(&self, builder: impl FnOnce(DiffBuilder) -> DiffBuilder) -> Arc<ListSnapshot> {
        let live = self.client.masternode_list();
        let built = builder(DiffBuilder::new(&live, live.height() + 1)).build();
        self.headers.insert(built.header);
        self.client.apply_diff(built.diff).expect("diff applies")
    }
}

pub fn seed_resolver() -> MockHostResolver {
    MockHostResolver::new()
        .with_host("seed.one", vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))])
        .with_host("seed.two", vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3))])
}

pub fn test_client(config: Config, anchor: Option<ListSnapshot>) -> TestClient {
    let headers = Arc::new(MemoryHeaderStore::new());
    let sink = Arc::new(MemoryMasternodeListSink::new());
    let peers = Arc::new(Mutex::new(MemoryPeerAddressStore::new()));
    let store: Arc<Mutex<dyn PeerAddressStore>> = peers.clone();

    let mut builder = DashFinalityClient::builder(config)
        .with_header_lookup(headers.clone())
        .with_list_sink(sink.clone())
        .with_peer_store(store)
        .with_verifier(Arc::new(TestBls))
        .with_host_resolver(Arc::new(seed_resolver()));
    if let Some(anchor) = anchor {
        builder = builder.with_anchor(anchor);
    }

    TestClient {
        client: builder.build().expect("client builds"),
        headers,
        sink,
        peers,
    }
}
