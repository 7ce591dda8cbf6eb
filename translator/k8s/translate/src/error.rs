use crate::{lookup::LookupError, tracker::Reference};

/// A hard translation failure. The caller should record it and retry the
/// translation later.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("could not track {reference}")]
    Track {
        reference: Reference,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to fetch {kind} '{name}'")]
    Fetch {
        kind: &'static str,
        name: String,
        #[source]
        source: LookupError,
    },

    #[error("failed to parse routes to drop")]
    DropRoutes(#[source] serde_json::Error),

    #[error("failed to encode upstream TLS context")]
    TransportSocket(#[from] prost::EncodeError),
}

impl TranslateError {
    pub(crate) fn fetch(
        kind: &'static str,
        namespace: &str,
        name: &str,
        source: LookupError,
    ) -> Self {
        let name = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}/{name}")
        };
        Self::Fetch { kind, name, source }
    }
}
