//! Annotations that tune how an individual ingress (or its namespace) is
//! translated.

use std::collections::BTreeMap;

/// Forces HTTP/2 off for every upstream of the ingress when set to `"true"`.
pub const DISABLE_HTTP2: &str = "ingress.translator.io/disable-http2";

/// Turns external authorization off for the ingress when set to `"true"`.
pub const DISABLE_EXT_AUTHZ: &str = "ingress.translator.io/disable-ext-authz";

/// A JSON document listing path prefixes whose requests are rejected.
pub const DROP_ROUTES: &str = "ingress.translator.io/drop-routes";

/// Set on a `Namespace` to serve its ingresses from a dedicated listener.
pub const LISTENER_PORT: &str = "ingress.translator.io/listener-port";

/// Paths whose requests are rejected rather than routed.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DropRoutes {
    #[serde(default)]
    pub routes: Vec<DropRoute>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DropRoute {
    pub path: String,
}

pub fn disable_http2(annotations: &BTreeMap<String, String>) -> bool {
    is_true(annotations, DISABLE_HTTP2)
}

pub fn disable_ext_authz(annotations: &BTreeMap<String, String>) -> bool {
    is_true(annotations, DISABLE_EXT_AUTHZ)
}

pub fn listener_port(annotations: &BTreeMap<String, String>) -> Option<&str> {
    annotations.get(LISTENER_PORT).map(String::as_str)
}

fn is_true(annotations: &BTreeMap<String, String>, key: &str) -> bool {
    annotations
        .get(key)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

// === impl DropRoutes ===

impl DropRoutes {
    /// Reads the drop-routes annotation. An absent or empty annotation yields
    /// no routes.
    pub fn from_annotations(
        annotations: &BTreeMap<String, String>,
    ) -> Result<Self, serde_json::Error> {
        match annotations.get(DROP_ROUTES).map(|v| v.trim()) {
            None | Some("") => Ok(Self::default()),
            Some(json) => serde_json::from_str(json),
        }
    }

    /// Returns each path, prefixed with `/` when it is not already.
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.routes.iter().map(|DropRoute { path }| {
            if path.starts_with('/') {
                path.clone()
            } else {
                format!("/{path}")
            }
        })
    }
}
