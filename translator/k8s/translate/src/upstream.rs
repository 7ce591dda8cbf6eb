use crate::{
    error::TranslateError,
    lookup::Lookup,
    tracker::{TrackedKind, Tracker},
    translate::Context,
};
use ingress_translator_core::{Cluster, DiscoveryType, LbEndpoint, Outcome, WeightedCluster};
use ingress_translator_k8s_api::{
    annotations, Endpoints, HttpIngressPath, IngressBackendSplit, IntOrString, ResourceExt,
    Service, ServicePort, SERVICE_TYPE_EXTERNAL_NAME,
};
use std::time;

pub(crate) const CONNECT_TIMEOUT: time::Duration = time::Duration::from_secs(5);

const DEFAULT_PORT: i32 = 80;

/// The cluster and weighted reference produced for a single split.
#[derive(Debug)]
pub(crate) struct Upstream {
    pub(crate) cluster: Cluster,
    pub(crate) weighted: WeightedCluster,
}

/// The ports a split resolves to on its service.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Ports {
    external: i32,
    target: i32,
    http2: bool,
}

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    /// Resolves a split to an upstream cluster.
    ///
    /// Both the service and its endpoints are tracked before either is read,
    /// so that the ingress is retranslated when either appears.
    pub(crate) fn upstream(
        &mut self,
        path: &HttpIngressPath,
        split: &IngressBackendSplit,
    ) -> Result<Outcome<Upstream>, TranslateError> {
        let (ns, name) = (split.service_namespace.as_str(), split.service_name.as_str());
        self.track(TrackedKind::Service, ns, name)?;
        self.track(TrackedKind::Endpoints, ns, name)?;

        let service = match Self::ready("service", ns, name, self.lookup.service(ns, name))? {
            Outcome::Ready(service) => service,
            Outcome::NotReady => return Ok(Outcome::NotReady),
        };

        let mut ports = resolve_ports(&service, &split.service_port);
        if annotations::disable_http2(self.ingress.annotations()) {
            ports.http2 = false;
        }

        let (discovery_type, endpoints) = match external_name(&service) {
            Some(host) => (
                DiscoveryType::LogicalDns,
                vec![LbEndpoint::new(host, port_value(ports.external))],
            ),
            None => {
                let endpoints =
                    match Self::ready("endpoints", ns, name, self.lookup.endpoints(ns, name))? {
                        Outcome::Ready(endpoints) => endpoints,
                        Outcome::NotReady => return Ok(Outcome::NotReady),
                    };
                (DiscoveryType::Static, lb_endpoints(&endpoints, ports.target))
            }
        };

        // Requests with a rewritten host are sent to a gateway that already
        // terminates TLS.
        let transport_socket = if self.config.internal_encryption && path.host_rewrite().is_none()
        {
            Some(self.upstream_transport_socket(ports.http2)?)
        } else {
            None
        };

        let cluster_name = format!("{ns}/{name}");
        tracing::debug!(
            cluster = %cluster_name,
            ?discovery_type,
            endpoints = endpoints.len(),
            http2 = ports.http2,
            tls = transport_socket.is_some(),
            "built cluster"
        );

        Ok(Outcome::Ready(Upstream {
            weighted: WeightedCluster::new(
                cluster_name.clone(),
                split.percent,
                &split.append_headers,
            ),
            cluster: Cluster::new(
                cluster_name,
                CONNECT_TIMEOUT,
                endpoints,
                ports.http2,
                transport_socket,
                discovery_type,
            ),
        }))
    }
}

/// Finds the service port a split refers to, and whether the service speaks
/// HTTP/2 on any port. When several ports match, the last one wins.
fn resolve_ports(service: &Service, port: &IntOrString) -> Ports {
    let svc_ports = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default();

    let (external, target) = svc_ports
        .iter()
        .filter(|sp| port_matches(sp, port))
        .last()
        .map(|sp| {
            let target = match sp.target_port {
                Some(IntOrString::Int(target)) => target,
                // Named or unset target ports resolve to the service port.
                _ => sp.port,
            };
            (sp.port, target)
        })
        .unwrap_or((DEFAULT_PORT, DEFAULT_PORT));

    let http2 = svc_ports
        .iter()
        .any(|sp| matches!(sp.name.as_deref(), Some("http2" | "h2c")));

    Ports {
        external,
        target,
        http2,
    }
}

fn port_matches(sp: &ServicePort, port: &IntOrString) -> bool {
    match port {
        IntOrString::Int(p) => sp.port == *p,
        IntOrString::String(name) => sp.name.as_deref() == Some(name.as_str()),
    }
}

fn external_name(service: &Service) -> Option<&str> {
    let spec = service.spec.as_ref()?;
    if spec.type_.as_deref() != Some(SERVICE_TYPE_EXTERNAL_NAME) {
        return None;
    }
    Some(spec.external_name.as_deref().unwrap_or_default())
}

/// Returns one endpoint per ready address, across all subsets.
fn lb_endpoints(endpoints: &Endpoints, target_port: i32) -> Vec<LbEndpoint> {
    endpoints
        .subsets
        .iter()
        .flatten()
        .flat_map(|subset| subset.addresses.iter().flatten())
        .map(|addr| LbEndpoint::new(addr.ip.clone(), port_value(target_port)))
        .collect()
}

fn port_value(port: i32) -> u32 {
    u32::try_from(port).unwrap_or_default()
}
