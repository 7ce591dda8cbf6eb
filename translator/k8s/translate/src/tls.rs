use crate::{
    config::{CA_CERT_KEY, UPSTREAM_SUBJECT_ALT_NAME},
    error::TranslateError,
    lookup::Lookup,
    tracker::{TrackedKind, Tracker},
    translate::Context,
};
use ingress_translator_core::{NamespacedName, SniMatch, TransportSocket, UpstreamTlsContext};
use ingress_translator_k8s_api::{secret_data, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    /// Builds one SNI match per TLS binding.
    ///
    /// Certificates are always required: a missing secret fails the
    /// translation rather than deferring it.
    pub(crate) fn sni_matches(&mut self) -> Result<Vec<SniMatch>, TranslateError> {
        let bindings = &self.ingress.spec.tls;
        let mut matches = Vec::with_capacity(bindings.len());
        for tls in bindings {
            let (ns, name) = (tls.secret_namespace.as_str(), tls.secret_name.as_str());
            self.track(TrackedKind::Secret, ns, name)?;
            let secret = self
                .lookup
                .secret(ns, name)
                .map_err(|source| TranslateError::fetch("secret", ns, name, source))?;

            matches.push(SniMatch {
                hosts: tls.hosts.clone(),
                cert_source: NamespacedName::new(ns, name),
                certificate_chain: secret_data(&secret, TLS_CERT_KEY),
                private_key: secret_data(&secret, TLS_PRIVATE_KEY_KEY),
            });
        }
        Ok(matches)
    }

    /// Builds the transport socket that originates TLS to an upstream,
    /// trusting only the platform CA.
    pub(crate) fn upstream_transport_socket(
        &self,
        http2: bool,
    ) -> Result<TransportSocket, TranslateError> {
        let (ns, name) = (
            self.config.serving_namespace.as_str(),
            self.config.ca_secret_name.as_str(),
        );
        let ca = self
            .lookup
            .secret(ns, name)
            .map_err(|source| TranslateError::fetch("CA secret", ns, name, source))?;

        let alpn = if http2 {
            vec!["h2".to_string()]
        } else {
            vec![]
        };
        let ctx = UpstreamTlsContext::new(
            secret_data(&ca, CA_CERT_KEY),
            UPSTREAM_SUBJECT_ALT_NAME,
            alpn,
        );
        Ok(TransportSocket::upstream_tls(&ctx)?)
    }
}
