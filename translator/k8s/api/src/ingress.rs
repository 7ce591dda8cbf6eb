use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Ingress describes how external and cluster-local traffic reaches a set of
/// services: which hosts it answers for, how paths are split across backends,
/// and which certificates terminate TLS.
///
/// The resource is owned by the serving platform; the translator only reads
/// it, so no schema is generated.
#[derive(Clone, Debug, Default, kube::CustomResource, serde::Deserialize, serde::Serialize)]
#[kube(
    group = "networking.internal.knative.dev",
    version = "v1alpha1",
    kind = "Ingress",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    /// TLS bindings. Each binding terminates TLS for its hosts using the
    /// referenced secret.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<IngressTls>,

    #[serde(default)]
    pub rules: Vec<IngressRule>,

    /// Whether plaintext requests to external hosts are served or redirected
    /// to HTTPS.
    #[serde(default)]
    pub http_option: HttpOption,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressTls {
    #[serde(default)]
    pub hosts: Vec<String>,
    pub secret_name: String,
    pub secret_namespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub http: HttpIngressRuleValue,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum Visibility {
    /// Reachable from outside the cluster.
    #[default]
    #[serde(rename = "ExternalIP")]
    ExternalIp,

    /// Reachable only from within the cluster.
    ClusterLocal,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum HttpOption {
    #[default]
    Enabled,
    Redirected,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct HttpIngressRuleValue {
    #[serde(default)]
    pub paths: Vec<HttpIngressPath>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressPath {
    /// A path prefix. Defaults to `/` when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Request headers that must match for this path to be selected.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderMatch>,

    /// Rewrites the request's authority before forwarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_host: Option<String>,

    /// Headers added to every request matching this path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub append_headers: BTreeMap<String, String>,

    #[serde(default)]
    pub splits: Vec<IngressBackendSplit>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct HeaderMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackendSplit {
    pub service_namespace: String,
    pub service_name: String,
    pub service_port: IntOrString,

    /// The share of traffic, as a percentage, sent to this backend.
    #[serde(default)]
    pub percent: u32,

    /// Headers added to requests sent to this backend.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub append_headers: BTreeMap<String, String>,
}

// === impl HttpIngressPath ===

impl HttpIngressPath {
    /// The path prefix, defaulting to `/`.
    pub fn path_or_default(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    /// The authority rewrite target, treating an empty string as unset.
    pub fn host_rewrite(&self) -> Option<&str> {
        self.rewrite_host.as_deref().filter(|h| !h.is_empty())
    }
}

// === impl Visibility ===

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalIp => "ExternalIP",
            Self::ClusterLocal => "ClusterLocal",
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalIp)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}
