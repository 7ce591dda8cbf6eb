use crate::route::{ExtAuthzPerRoute, Route};
use std::collections::BTreeMap;

/// A named group of routes selected by the request's authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
    pub ext_authz: Option<ExtAuthzPerRoute>,
}

impl VirtualHost {
    pub fn new(name: impl Into<String>, domains: Vec<String>, routes: Vec<Route>) -> Self {
        Self {
            name: name.into(),
            domains,
            routes,
            ext_authz: None,
        }
    }

    /// Builds a virtual host whose requests carry `context_extensions` to the
    /// external authorization service.
    pub fn with_ext_authz(
        name: impl Into<String>,
        context_extensions: BTreeMap<String, String>,
        domains: Vec<String>,
        routes: Vec<Route>,
    ) -> Self {
        Self {
            ext_authz: Some(ExtAuthzPerRoute::CheckSettings { context_extensions }),
            ..Self::new(name, domains, routes)
        }
    }

    pub fn context_extensions(&self) -> Option<&BTreeMap<String, String>> {
        match &self.ext_authz {
            Some(ExtAuthzPerRoute::CheckSettings { context_extensions }) => Some(context_extensions),
            _ => None,
        }
    }
}
