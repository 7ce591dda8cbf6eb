use ahash::AHashMap as HashMap;
use anyhow::Result;
use ingress_translator_core::NamespacedName;
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// The kinds of objects whose changes re-trigger translation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedKind {
    Secret,
    Service,
    Endpoints,
}

/// A reference to an object that a translation depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub kind: TrackedKind,
    pub namespace: String,
    pub name: String,
}

/// Records that an ingress depends on another object so that it is translated
/// again when that object changes.
///
/// Translations run concurrently, so implementations must accept concurrent
/// registrations.
pub trait Tracker: Send + Sync {
    fn track_reference(&self, reference: &Reference, owner: &NamespacedName) -> Result<()>;
}

/// A tracker that remembers, for each ingress, every object it depends on.
#[derive(Debug, Default)]
pub struct References(Mutex<HashMap<NamespacedName, BTreeSet<Reference>>>);

// === impl TrackedKind ===

impl TrackedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::Service => "Service",
            Self::Endpoints => "Endpoints",
        }
    }

    pub fn api_version(&self) -> &'static str {
        "v1"
    }
}

impl std::fmt::Display for TrackedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

// === impl Reference ===

impl Reference {
    pub fn new(kind: TrackedKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} {}/{}",
            self.kind,
            self.kind.api_version(),
            self.namespace,
            self.name
        )
    }
}

// === impl References ===

impl References {
    /// Returns the objects `owner` depends on.
    pub fn get(&self, owner: &NamespacedName) -> BTreeSet<Reference> {
        self.0.lock().get(owner).cloned().unwrap_or_default()
    }

    /// Returns the owners that depend on `reference`.
    pub fn owners_of(&self, reference: &Reference) -> Vec<NamespacedName> {
        let mut owners = self
            .0
            .lock()
            .iter()
            .filter(|(_, refs)| refs.contains(reference))
            .map(|(owner, _)| owner.clone())
            .collect::<Vec<_>>();
        owners.sort();
        owners
    }

    /// Forgets every reference held by `owner`, e.g. once it is deleted.
    pub fn untrack(&self, owner: &NamespacedName) {
        self.0.lock().remove(owner);
    }
}

impl Tracker for References {
    fn track_reference(&self, reference: &Reference, owner: &NamespacedName) -> Result<()> {
        self.0
            .lock()
            .entry(owner.clone())
            .or_default()
            .insert(reference.clone());
        Ok(())
    }
}

impl<T: Tracker + ?Sized> Tracker for std::sync::Arc<T> {
    #[inline]
    fn track_reference(&self, reference: &Reference, owner: &NamespacedName) -> Result<()> {
        (**self).track_reference(reference, owner)
    }
}
