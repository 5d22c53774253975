use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::{NetworkError, NetworkResult};
use crate::network::discovery::HostResolver;

#[derive(Debug, Clone)]
enum MockAnswer {
    Addresses(Vec<IpAddr>),
    Failure,
    Hang,
}

/// Scripted [`HostResolver`]. Unknown hosts fail like an NXDOMAIN answer.
#[derive(Debug, Clone, Default)]
pub struct MockHostResolver {
    answers: HashMap<String, MockAnswer>,
}

impl MockHostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, addresses: Vec<IpAddr>) -> Self {
        self.answers.insert(host.to_string(), MockAnswer::Addresses(addresses));
        self
    }

    pub fn with_failure(mut self, host: &str) -> Self {
        self.answers.insert(host.to_string(), MockAnswer::Failure);
        self
    }

    /// Lookups of `host` never complete.
    pub fn with_hanging(mut self, host: &str) -> Self {
        self.answers.insert(host.to_string(), MockAnswer::Hang);
        self
    }
}

#[async_trait]
impl HostResolver for MockHostResolver {
    async fn lookup_ip(&self, host: &str) -> NetworkResult<Vec<IpAddr>> {
        match self.answers.get(host) {
            Some(MockAnswer::Addresses(addresses)) => Ok(addresses.clone()),
            Some(MockAnswer::Hang) => std::future::pending().await,
            Some(MockAnswer::Failure) | None => Err(NetworkError::DnsLookup {
                host: host.to_string(),
                reason: "no record found".to_string(),
            }),
        }
    }
}
