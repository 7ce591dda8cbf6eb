use crate::{error::TranslateError, lookup::Lookup, tracker::Tracker, translate::Context};
use ingress_translator_k8s_api::{annotations, ResourceExt};

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    /// Returns the listener port selected by the ingress's namespace when
    /// traffic is isolated by port.
    ///
    /// A namespace without the annotation is served by the shared listeners.
    pub(crate) fn listener_port(&self) -> Result<Option<String>, TranslateError> {
        if !self.isolated() {
            return Ok(None);
        }

        let ns = self.owner().namespace.as_str();
        let namespace = self
            .lookup
            .namespace(ns)
            .map_err(|source| TranslateError::fetch("namespace", "", ns, source))?;

        let port = annotations::listener_port(namespace.annotations()).map(str::to_string);
        if let Some(port) = &port {
            tracing::info!(ingress = %self.owner(), %port, "mapping ingress to listener port");
        }
        Ok(port)
    }
}
