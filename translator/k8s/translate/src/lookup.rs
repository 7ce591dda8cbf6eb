use ahash::AHashMap as HashMap;
use ingress_translator_k8s_api::{Endpoints, Namespace, Resource, ResourceExt, Secret, Service};
use parking_lot::RwLock;
use std::sync::Arc;

/// Point lookups of the cluster state referenced by an ingress.
///
/// Implementations are expected to be backed by a cache that is safe for
/// concurrent reads. Lookups must not perform long-running I/O.
pub trait Lookup: Send + Sync {
    fn secret(&self, namespace: &str, name: &str) -> Result<Arc<Secret>, LookupError>;

    fn service(&self, namespace: &str, name: &str) -> Result<Arc<Service>, LookupError>;

    fn endpoints(&self, namespace: &str, name: &str) -> Result<Arc<Endpoints>, LookupError>;

    fn namespace(&self, name: &str) -> Result<Arc<Namespace>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The object does not exist (yet).
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// An in-memory cache of the resources an ingress may reference.
///
/// The index is updated through kubert's index traits so that it can be fed
/// directly from resource watches.
#[derive(Debug, Default)]
pub struct Index {
    secrets: ByNs<Secret>,
    services: ByNs<Service>,
    endpoints: ByNs<Endpoints>,
    namespaces: HashMap<String, Arc<Namespace>>,
}

pub type SharedIndex = Arc<RwLock<Index>>;

type ByNs<T> = HashMap<String, HashMap<String, Arc<T>>>;

// === impl LookupError ===

impl LookupError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }
}

fn get<T>(by_ns: &ByNs<T>, kind: &'static str, ns: &str, name: &str) -> Result<Arc<T>, LookupError> {
    by_ns
        .get(ns)
        .and_then(|objs| objs.get(name))
        .cloned()
        .ok_or_else(|| LookupError::not_found(kind, format!("{ns}/{name}")))
}

fn insert<T: ResourceExt>(by_ns: &mut ByNs<T>, kind: &'static str, resource: T) {
    let Some(name) = resource.meta().name.clone() else {
        tracing::warn!(%kind, "ignoring resource without a name");
        return;
    };
    let Some(ns) = resource.namespace() else {
        tracing::warn!(%kind, %name, "ignoring resource without a namespace");
        return;
    };
    tracing::trace!(%kind, %ns, %name, "indexing");
    by_ns.entry(ns).or_default().insert(name, Arc::new(resource));
}

fn remove<T>(by_ns: &mut ByNs<T>, namespace: &str, name: &str) {
    if let Some(objs) = by_ns.get_mut(namespace) {
        objs.remove(name);
        if objs.is_empty() {
            by_ns.remove(namespace);
        }
    }
}

impl kubert::index::IndexNamespacedResource<Secret> for Index {
    fn apply(&mut self, secret: Secret) {
        insert(&mut self.secrets, "secret", secret);
    }

    fn delete(&mut self, namespace: String, name: String) {
        remove(&mut self.secrets, &namespace, &name);
    }
}

impl kubert::index::IndexNamespacedResource<Service> for Index {
    fn apply(&mut self, service: Service) {
        insert(&mut self.services, "service", service);
    }

    fn delete(&mut self, namespace: String, name: String) {
        remove(&mut self.services, &namespace, &name);
    }
}

impl kubert::index::IndexNamespacedResource<Endpoints> for Index {
    fn apply(&mut self, endpoints: Endpoints) {
        insert(&mut self.endpoints, "endpoints", endpoints);
    }

    fn delete(&mut self, namespace: String, name: String) {
        remove(&mut self.endpoints, &namespace, &name);
    }
}

impl kubert::index::IndexClusterResource<Namespace> for Index {
    fn apply(&mut self, namespace: Namespace) {
        let Some(name) = namespace.meta().name.clone() else {
            tracing::warn!("ignoring namespace without a name");
            return;
        };
        tracing::trace!(%name, "indexing namespace");
        self.namespaces.insert(name, Arc::new(namespace));
    }

    fn delete(&mut self, name: String) {
        self.namespaces.remove(&name);
    }
}

impl Lookup for RwLock<Index> {
    fn secret(&self, namespace: &str, name: &str) -> Result<Arc<Secret>, LookupError> {
        get(&self.read().secrets, "secret", namespace, name)
    }

    fn service(&self, namespace: &str, name: &str) -> Result<Arc<Service>, LookupError> {
        get(&self.read().services, "service", namespace, name)
    }

    fn endpoints(&self, namespace: &str, name: &str) -> Result<Arc<Endpoints>, LookupError> {
        get(&self.read().endpoints, "endpoints", namespace, name)
    }

    fn namespace(&self, name: &str) -> Result<Arc<Namespace>, LookupError> {
        self.read()
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::not_found("namespace", name))
    }
}

impl<L: Lookup + ?Sized> Lookup for Arc<L> {
    #[inline]
    fn secret(&self, namespace: &str, name: &str) -> Result<Arc<Secret>, LookupError> {
        (**self).secret(namespace, name)
    }

    #[inline]
    fn service(&self, namespace: &str, name: &str) -> Result<Arc<Service>, LookupError> {
        (**self).service(namespace, name)
    }

    #[inline]
    fn endpoints(&self, namespace: &str, name: &str) -> Result<Arc<Endpoints>, LookupError> {
        (**self).endpoints(namespace, name)
    }

    #[inline]
    fn namespace(&self, name: &str) -> Result<Arc<Namespace>, LookupError> {
        (**self).namespace(name)
    }
}
