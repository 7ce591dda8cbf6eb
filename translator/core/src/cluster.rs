use crate::tls::TransportSocket;
use std::time;

/// Determines how the proxy discovers the members of a cluster.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscoveryType {
    /// Members are listed inline in the cluster's load assignment.
    Static,

    /// A single hostname that the proxy resolves asynchronously, connecting to
    /// the first address returned.
    LogicalDns,
}

/// An upstream cluster: a named group of endpoints and the policy used to
/// connect to them.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub discovery_type: DiscoveryType,
    pub connect_timeout: time::Duration,
    pub load_assignment: ClusterLoadAssignment,

    /// Indicates that the upstream speaks HTTP/2 with prior knowledge.
    pub http2: bool,

    pub transport_socket: Option<TransportSocket>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterLoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LbEndpoint>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LbEndpoint {
    pub address: SocketAddress,
}

/// A TCP socket address. `address` is either an IP or, for logical-DNS
/// clusters, a hostname.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SocketAddress {
    pub address: String,
    pub port_value: u32,
}

// === impl Cluster ===

impl Cluster {
    pub fn new(
        name: impl Into<String>,
        connect_timeout: time::Duration,
        endpoints: Vec<LbEndpoint>,
        http2: bool,
        transport_socket: Option<TransportSocket>,
        discovery_type: DiscoveryType,
    ) -> Self {
        let name = name.into();
        Self {
            load_assignment: ClusterLoadAssignment {
                cluster_name: name.clone(),
                endpoints,
            },
            name,
            discovery_type,
            connect_timeout,
            http2,
            transport_socket,
        }
    }

    #[inline]
    pub fn endpoints(&self) -> &[LbEndpoint] {
        &self.load_assignment.endpoints
    }
}

// === impl LbEndpoint ===

impl LbEndpoint {
    pub fn new(address: impl Into<String>, port_value: u32) -> Self {
        Self {
            address: SocketAddress {
                address: address.into(),
                port_value,
            },
        }
    }
}

impl std::fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port_value)
    }
}
