//! Data-plane configuration model produced by the ingress translator.
//!
//! The types in this crate mirror the shapes of the proxy's v3 dynamic
//! configuration API (clusters, endpoints, routes, virtual hosts and TLS
//! transport sockets) closely enough that a publishing layer can convert them
//! one-to-one into wire messages. The upstream TLS context is already encoded
//! as a protobuf `Any`, since that is how the proxy expects typed extension
//! configuration.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod route;
pub mod tls;
pub mod virtual_host;

pub use self::{
    cluster::{Cluster, ClusterLoadAssignment, DiscoveryType, LbEndpoint, SocketAddress},
    route::{
        DirectResponseAction, ExtAuthzPerRoute, ForwardAction, HeaderMatcher, HeaderValueOption,
        RedirectAction, Route, RouteAction, RouteKind, RouteMatch, WeightedCluster,
    },
    tls::{SniMatch, TransportSocket, UpstreamTlsContext},
    virtual_host::VirtualHost,
};

/// Identifies a namespaced Kubernetes object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

/// The proxy configuration fragment produced for a single ingress.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translated {
    pub name: NamespacedName,

    /// Overrides the listener that serves this ingress's virtual hosts. `None`
    /// selects the default shared listener.
    pub listener_port: Option<String>,

    /// One entry per TLS binding, in declaration order.
    pub sni_matches: Vec<SniMatch>,

    /// One entry per split. Clusters are not deduplicated.
    pub clusters: Vec<Cluster>,

    pub external_virtual_hosts: Vec<VirtualHost>,
    pub external_tls_virtual_hosts: Vec<VirtualHost>,
    pub internal_virtual_hosts: Vec<VirtualHost>,
}

/// The non-error result of a translation step.
///
/// `NotReady` signals that a dependency has not been created yet. It is not a
/// failure: the caller should publish nothing and wait to be re-triggered.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T = Translated> {
    Ready(T),
    NotReady,
}

// === impl NamespacedName ===

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl Outcome ===

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::NotReady => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ready(v) => Outcome::Ready(f(v)),
            Self::NotReady => Outcome::NotReady,
        }
    }
}
