use anyhow::{anyhow, Error, Result};
use ingress_translator_core::NamespacedName;
use ingress_translator_k8s_api::{annotations, Ingress, ResourceExt};

/// The identity that upstream data-plane certificates are issued for.
pub const UPSTREAM_SUBJECT_ALT_NAME: &str = "data-plane.knative.dev";

/// The key of the CA certificate in the platform's CA secret.
pub const CA_CERT_KEY: &str = "ca-cert.pem";

/// Holds the configuration that applies to every translation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Originates TLS to upstreams, pinned to the platform CA.
    pub internal_encryption: bool,

    pub traffic_isolation: TrafficIsolation,

    /// Suppresses HTTPS redirect routes, e.g. when a front-end proxy already
    /// performs the redirect.
    pub http_option_disabled: bool,

    /// Enables the external authorization filter. Individual ingresses may
    /// opt out via annotation.
    pub ext_authz_enabled: bool,

    /// A single certificate served for every host. When set, TLS route tables
    /// are produced for every ingress, even those without TLS bindings.
    pub certs_secret: Option<NamespacedName>,

    /// The namespace where the serving control plane is deployed.
    pub serving_namespace: String,

    /// The secret, in `serving_namespace`, holding the upstream CA.
    pub ca_secret_name: String,
}

/// Determines how ingresses are assigned to listeners.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrafficIsolation {
    /// All ingresses share the default listeners.
    #[default]
    None,

    /// Ingresses are served by the listener named by their namespace's
    /// listener-port annotation.
    Port,
}

// === impl Config ===

impl Default for Config {
    fn default() -> Self {
        Self {
            internal_encryption: false,
            traffic_isolation: TrafficIsolation::None,
            http_option_disabled: false,
            ext_authz_enabled: false,
            certs_secret: None,
            serving_namespace: "knative-serving".to_string(),
            ca_secret_name: "routing-serving-certs".to_string(),
        }
    }
}

impl Config {
    #[inline]
    pub fn use_https_listener_with_one_cert(&self) -> bool {
        self.certs_secret.is_some()
    }

    /// Indicates whether requests to `ingress` are subject to external
    /// authorization.
    pub fn ext_authz_enabled_for(&self, ingress: &Ingress) -> bool {
        self.ext_authz_enabled && !annotations::disable_ext_authz(ingress.annotations())
    }
}

// === impl TrafficIsolation ===

impl std::str::FromStr for TrafficIsolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "none" => Ok(Self::None),
            "port" => Ok(Self::Port),
            s => Err(anyhow!("invalid traffic isolation: {:?}", s)),
        }
    }
}

impl std::fmt::Display for TrafficIsolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => "none".fmt(f),
            Self::Port => "port".fmt(f),
        }
    }
}
