use crate::{
    core::Outcome,
    load,
    translate::{Config, Index, NamespacedName, References, TrafficIsolation, Translator},
};
use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Parser)]
#[clap(
    name = "ingress-translator",
    about = "Translates an ingress into proxy configuration"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "ingress_translator=info,warn",
        env = "INGRESS_TRANSLATOR_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// Originates TLS to upstreams, trusting only the serving CA.
    #[clap(long, env = "INTERNAL_ENCRYPTION")]
    internal_encryption: bool,

    /// How ingresses are assigned to listeners: `none` or `port`.
    #[clap(long, default_value = "none", env = "TRAFFIC_ISOLATION")]
    traffic_isolation: TrafficIsolation,

    /// Never emits HTTPS redirects, e.g. when a front-end proxy performs
    /// them.
    #[clap(long, env = "HTTPOPTION_DISABLED")]
    http_option_disabled: bool,

    #[clap(long, env = "EXT_AUTHZ_ENABLED")]
    ext_authz_enabled: bool,

    /// The namespace of a certificate served for every host.
    #[clap(long, env = "CERTS_SECRET_NAMESPACE")]
    certs_secret_namespace: Option<String>,

    /// The name of a certificate served for every host.
    #[clap(long, env = "CERTS_SECRET_NAME")]
    certs_secret_name: Option<String>,

    #[clap(long, default_value = "knative-serving", env = "SERVING_NAMESPACE")]
    serving_namespace: String,

    #[clap(long, default_value = "routing-serving-certs")]
    ca_secret_name: String,

    /// JSON files holding the secrets, services, endpoints and namespaces the
    /// ingress refers to.
    #[clap(long = "resources", short = 'r')]
    resources: Vec<PathBuf>,

    /// A JSON file holding the ingress to translate.
    ingress: PathBuf,
}

impl Args {
    #[inline]
    pub fn parse_and_run() -> Result<()> {
        Self::parse().run()
    }

    pub fn run(self) -> Result<()> {
        self.log_format.clone().try_init(self.log_level.clone())?;

        let config = self.config();
        tracing::debug!(?config, "configured");

        let index = Index::shared();
        for path in &self.resources {
            let count = load::apply_resources(&index, path)?;
            tracing::debug!(path = %path.display(), count, "loaded resources");
        }
        let ingress = load::read_ingress(&self.ingress)?;

        let tracker = Arc::new(References::default());
        let translation = Translator::new(index, tracker).translate(&ingress, &config);
        for reference in &translation.references {
            tracing::debug!(%reference, "depends on");
        }
        match translation.into_result()? {
            Outcome::Ready(translated) => println!("{translated:#?}"),
            Outcome::NotReady => {
                tracing::warn!("ingress dependencies are not ready; nothing to publish")
            }
        }
        Ok(())
    }

    /// Builds the translation configuration.
    ///
    /// The single-certificate secret is only configured when both its
    /// namespace and name are set.
    pub fn config(&self) -> Config {
        let certs_secret = match (&self.certs_secret_namespace, &self.certs_secret_name) {
            (Some(ns), Some(name)) if !ns.is_empty() && !name.is_empty() => {
                Some(NamespacedName::new(ns.as_str(), name.as_str()))
            }
            _ => None,
        };
        Config {
            internal_encryption: self.internal_encryption,
            traffic_isolation: self.traffic_isolation,
            http_option_disabled: self.http_option_disabled,
            ext_authz_enabled: self.ext_authz_enabled,
            certs_secret,
            serving_namespace: self.serving_namespace.clone(),
            ca_secret_name: self.ca_secret_name.clone(),
        }
    }
}
