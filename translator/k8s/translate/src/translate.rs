use crate::{
    config::{Config, TrafficIsolation},
    error::TranslateError,
    lookup::{Lookup, LookupError},
    tracker::{Reference, TrackedKind, Tracker},
};
use ingress_translator_core::{NamespacedName, Outcome, Translated};
use ingress_translator_k8s_api::{annotations::DropRoutes, Ingress, ResourceExt};
use std::sync::Arc;

/// Translates ingresses into proxy configuration.
///
/// The translator holds no state between translations: it may be shared
/// across tasks and invoked concurrently for different ingresses.
#[derive(Clone, Debug)]
pub struct Translator<L, T> {
    lookup: L,
    tracker: T,
}

/// The result of translating a single ingress.
#[derive(Debug)]
pub struct Translation {
    /// Every object registered with the tracker, in registration order. This
    /// is populated even if translation fails or is not ready.
    pub references: Vec<Reference>,

    pub result: Result<Outcome, TranslateError>,
}

/// State for a single translation.
pub(crate) struct Context<'t, L, T> {
    pub(crate) lookup: &'t L,
    tracker: &'t T,
    pub(crate) config: &'t Config,
    pub(crate) ingress: &'t Ingress,
    owner: NamespacedName,
    pub(crate) ext_authz: bool,
    drop_routes: Option<Arc<DropRoutes>>,
    references: Vec<Reference>,
}

// === impl Translator ===

impl<L: Lookup, T: Tracker> Translator<L, T> {
    pub fn new(lookup: L, tracker: T) -> Self {
        Self { lookup, tracker }
    }

    pub fn translate(&self, ingress: &Ingress, config: &Config) -> Translation {
        let mut cx = Context {
            lookup: &self.lookup,
            tracker: &self.tracker,
            config,
            ingress,
            owner: NamespacedName::new(
                ingress.namespace().unwrap_or_default(),
                ingress.metadata.name.clone().unwrap_or_default(),
            ),
            ext_authz: config.ext_authz_enabled_for(ingress),
            drop_routes: None,
            references: Vec::new(),
        };
        let result = cx.translate();
        match &result {
            Ok(Outcome::Ready(_)) => {}
            Ok(Outcome::NotReady) => {
                tracing::debug!(ingress = %cx.owner, "ingress dependencies not ready")
            }
            Err(error) => tracing::debug!(ingress = %cx.owner, %error, "failed to translate"),
        }
        Translation {
            references: cx.references,
            result,
        }
    }
}

// === impl Translation ===

impl Translation {
    #[inline]
    pub fn into_result(self) -> Result<Outcome, TranslateError> {
        self.result
    }
}

// === impl Context ===

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    fn translate(&mut self) -> Result<Outcome, TranslateError> {
        let ingress = self.ingress;

        let sni_matches = self.sni_matches()?;

        let rules = &ingress.spec.rules;
        let mut internal_virtual_hosts = Vec::with_capacity(rules.len());
        let mut external_virtual_hosts = Vec::with_capacity(rules.len());
        let mut external_tls_virtual_hosts = Vec::with_capacity(rules.len());
        let mut clusters = Vec::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            let rule_name = format!("({}).Rules[{i}]", self.owner);

            let rule_routes = match self.rule_routes(&rule_name, rule)? {
                Outcome::Ready(routes) => routes,
                Outcome::NotReady => return Ok(Outcome::NotReady),
            };
            clusters.extend(rule_routes.clusters);

            // A rule without routes would publish an incomplete route table.
            if rule_routes.routes.is_empty() {
                tracing::debug!(rule = %rule_name, "rule has no routes");
                return Ok(Outcome::NotReady);
            }

            let hosts =
                self.virtual_hosts(rule_name, rule, rule_routes.routes, rule_routes.tls_routes);
            internal_virtual_hosts.push(hosts.plain.clone());
            if rule.visibility.is_external() {
                external_virtual_hosts.push(hosts.plain);
                if let Some(tls) = hosts.tls {
                    external_tls_virtual_hosts.push(tls);
                }
            }
        }

        let listener_port = self.listener_port()?;

        tracing::debug!(
            ingress = %self.owner,
            clusters = clusters.len(),
            internal = internal_virtual_hosts.len(),
            external = external_virtual_hosts.len(),
            external_tls = external_tls_virtual_hosts.len(),
            "translated ingress"
        );

        Ok(Outcome::Ready(Translated {
            name: self.owner.clone(),
            listener_port,
            sni_matches,
            clusters,
            external_virtual_hosts,
            external_tls_virtual_hosts,
            internal_virtual_hosts,
        }))
    }

    /// Registers a dependency on an object before it is read.
    pub(crate) fn track(
        &mut self,
        kind: TrackedKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), TranslateError> {
        let reference = Reference::new(kind, namespace, name);
        self.references.push(reference.clone());
        self.tracker
            .track_reference(&reference, &self.owner)
            .map_err(|source| TranslateError::Track { reference, source })
    }

    /// Classifies a lookup result: a missing object is not an error but
    /// defers translation.
    pub(crate) fn ready<V>(
        kind: &'static str,
        namespace: &str,
        name: &str,
        res: Result<Arc<V>, LookupError>,
    ) -> Result<Outcome<Arc<V>>, TranslateError> {
        match res {
            Ok(v) => Ok(Outcome::Ready(v)),
            Err(error) if error.is_not_found() => {
                tracing::warn!(%namespace, %name, "{kind} not yet created");
                Ok(Outcome::NotReady)
            }
            Err(source) => Err(TranslateError::fetch(kind, namespace, name, source)),
        }
    }

    /// Reads the routes to drop, parsing the annotation at most once per
    /// translation.
    pub(crate) fn drop_routes(&mut self) -> Result<Arc<DropRoutes>, TranslateError> {
        if let Some(routes) = &self.drop_routes {
            return Ok(routes.clone());
        }
        let routes = DropRoutes::from_annotations(self.ingress.annotations())
            .map(Arc::new)
            .map_err(TranslateError::DropRoutes)?;
        self.drop_routes = Some(routes.clone());
        Ok(routes)
    }

    pub(crate) fn isolated(&self) -> bool {
        self.config.traffic_isolation == TrafficIsolation::Port
    }

    #[inline]
    pub(crate) fn owner(&self) -> &NamespacedName {
        &self.owner
    }
}
