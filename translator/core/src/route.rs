use std::{collections::BTreeMap, time};

/// The prefix used by HTTP-01 ACME challenges.
pub const ACME_CHALLENGE_PREFIX: &str = "/.well-known/acme-challenge/";

/// The status returned for requests matching a dropped route.
pub const DROP_STATUS: u16 = 404;

/// The status returned by HTTPS redirects.
pub const REDIRECT_STATUS: u16 = 301;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub r#match: RouteMatch,
    pub action: RouteAction,
    pub request_headers_to_add: Vec<HeaderValueOption>,

    /// Per-route external authorization settings. Only set to disable
    /// authorization for routes that must bypass it.
    pub ext_authz: Option<ExtAuthzPerRoute>,
}

/// Distinguishes the behaviors a translated route may have.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Forwards to weighted clusters.
    Normal,

    /// Forwards to weighted clusters, skipping the authorization filter.
    ExtAuthzDisabled,

    /// Redirects plaintext requests to HTTPS.
    Redirect,

    /// Rejects matching requests without contacting an upstream.
    Drop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub prefix: String,
    pub headers: Vec<HeaderMatcher>,
}

/// Matches a request header by name. When `exact_match` is unset, the header
/// only has to be present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderMatcher {
    pub name: String,
    pub exact_match: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAction {
    Route(ForwardAction),
    Redirect(RedirectAction),
    DirectResponse(DirectResponseAction),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardAction {
    pub weighted_clusters: Vec<WeightedCluster>,

    /// A zero timeout disables the route timeout.
    pub timeout: time::Duration,

    pub upgrade_configs: Vec<String>,
    pub host_rewrite_literal: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectAction {
    pub https_redirect: bool,
    pub response_code: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectResponseAction {
    pub status: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedCluster {
    pub name: String,
    pub weight: u32,
    pub request_headers_to_add: Vec<HeaderValueOption>,
}

/// A header to add to requests. Existing values are overwritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderValueOption {
    pub key: String,
    pub value: String,
    pub append: bool,
}

/// External authorization filter configuration attached to a virtual host or
/// a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtAuthzPerRoute {
    Disabled,
    CheckSettings {
        context_extensions: BTreeMap<String, String>,
    },
}

// === impl Route ===

impl Route {
    /// Forwards requests matching `path` to the weighted clusters.
    pub fn new(
        name: impl Into<String>,
        headers: Vec<HeaderMatcher>,
        path: impl Into<String>,
        weighted_clusters: Vec<WeightedCluster>,
        timeout: time::Duration,
        append_headers: &BTreeMap<String, String>,
        host_rewrite: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            r#match: RouteMatch {
                prefix: path.into(),
                headers,
            },
            action: RouteAction::Route(ForwardAction {
                weighted_clusters,
                timeout,
                upgrade_configs: vec!["websocket".to_string()],
                host_rewrite_literal: host_rewrite.map(Into::into),
            }),
            request_headers_to_add: headers_to_add(append_headers),
            ext_authz: None,
        }
    }

    /// Exempts the route from external authorization.
    pub fn without_ext_authz(self) -> Self {
        Self {
            ext_authz: Some(ExtAuthzPerRoute::Disabled),
            ..self
        }
    }

    pub fn new_redirect(
        name: impl Into<String>,
        headers: Vec<HeaderMatcher>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            r#match: RouteMatch {
                prefix: path.into(),
                headers,
            },
            action: RouteAction::Redirect(RedirectAction {
                https_redirect: true,
                response_code: REDIRECT_STATUS,
            }),
            request_headers_to_add: vec![],
            ext_authz: None,
        }
    }

    pub fn new_drop(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r#match: RouteMatch {
                prefix: path.into(),
                headers: vec![],
            },
            action: RouteAction::DirectResponse(DirectResponseAction {
                status: DROP_STATUS,
            }),
            request_headers_to_add: vec![],
            ext_authz: None,
        }
    }

    pub fn kind(&self) -> RouteKind {
        match (&self.action, &self.ext_authz) {
            (RouteAction::Route(_), Some(ExtAuthzPerRoute::Disabled)) => RouteKind::ExtAuthzDisabled,
            (RouteAction::Route(_), _) => RouteKind::Normal,
            (RouteAction::Redirect(_), _) => RouteKind::Redirect,
            (RouteAction::DirectResponse(_), _) => RouteKind::Drop,
        }
    }

    /// Returns the weighted clusters of a forwarding route.
    pub fn weighted_clusters(&self) -> &[WeightedCluster] {
        match &self.action {
            RouteAction::Route(fwd) => &fwd.weighted_clusters,
            _ => &[],
        }
    }
}

// === impl WeightedCluster ===

impl WeightedCluster {
    pub fn new(name: impl Into<String>, weight: u32, headers: &BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            weight,
            request_headers_to_add: headers_to_add(headers),
        }
    }
}

fn headers_to_add(headers: &BTreeMap<String, String>) -> Vec<HeaderValueOption> {
    headers
        .iter()
        .map(|(key, value)| HeaderValueOption {
            key: key.clone(),
            value: value.clone(),
            append: false,
        })
        .collect()
}
