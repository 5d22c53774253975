//! Peer address discovery.

pub mod constants;
pub mod discovery;

pub use discovery::{HickoryResolver, HostResolver, PeerAddress, PeerAddressResolver};
