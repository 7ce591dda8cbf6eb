//! Ingress Translator
//!
//! Translates an `Ingress` into a fragment of proxy configuration: upstream clusters, routes
//! grouped into virtual hosts, and SNI matches for TLS termination. Translation reads the
//! following cluster resources:
//!
//! - Each TLS binding references a `Secret` holding the certificate chain and private key.
//! - Each split references a `Service`. Normal services are resolved through their `Endpoints`;
//!   `ExternalName` services are resolved by the proxy via DNS.
//! - When upstream encryption is enabled, the platform's CA `Secret` pins the upstream identity.
//! - When traffic isolation is enabled, the ingress's `Namespace` may select a listener port.
//!
//! ```text
//! [ Ingress ] -> [ Rule ] -> [ Path ] -> [ Split ] -> [ Service ] -> [ Endpoints ]
//!      \-> [ TLS ] -> [ Secret ]
//! ```
//!
//! A translation is a pure function of the ingress, the cluster state visible through a
//! [`Lookup`], and a [`Config`] snapshot. It either produces a complete [`Translated`] fragment,
//! reports that a service or endpoints object does not exist yet ([`Outcome::NotReady`]), or
//! fails. Every object read during translation is registered with a [`Tracker`] before it is
//! fetched so that changes to it re-trigger translation.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod listener;
mod lookup;
mod route;
mod tls;
mod tracker;
mod translate;
mod upstream;
mod virtual_host;

#[cfg(test)]
mod tests;

pub use self::{
    config::{Config, TrafficIsolation},
    error::TranslateError,
    lookup::{Index, Lookup, LookupError, SharedIndex},
    tracker::{Reference, References, TrackedKind, Tracker},
    translate::{Translation, Translator},
    virtual_host::domains_for_rule,
};
pub use ingress_translator_core::{NamespacedName, Outcome, Translated};
