use crate::{
    Config, Index, Lookup, LookupError, Outcome, Reference, References, SharedIndex,
    TrackedKind, Translated, Translation, Translator,
};
use ingress_translator_core::{DiscoveryType, RouteKind};
use ingress_translator_k8s_api::{
    self as k8s, ByteString, EndpointAddress, EndpointSubset, HttpIngressPath,
    HttpIngressRuleValue, IngressBackendSplit, IngressRule, IngressSpec, IntOrString,
    Visibility,
};
use kubert::index::{IndexClusterResource, IndexNamespacedResource};
use maplit::btreemap;
use std::{collections::BTreeMap, sync::Arc};
use tracing::Level;


struct TestConfig {
    index: SharedIndex,
    tracker: Arc<References>,
    config: Config,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl TestConfig {
    fn new(config: Config) -> Self {
        tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .try_init()
            .ok();
        Self {
            index: Index::shared(),
            tracker: Default::default(),
            config,
        }
    }

    fn translate(&self, ingress: &k8s::Ingress) -> Translation {
        self.translate_with(self.index.clone(), ingress)
    }

    fn translate_with<L: Lookup>(&self, lookup: L, ingress: &k8s::Ingress) -> Translation {
        Translator::new(lookup, self.tracker.clone()).translate(ingress, &self.config)
    }

    fn apply<R>(&self, resource: R)
    where
        Index: IndexNamespacedResource<R>,
    {
        IndexNamespacedResource::apply(&mut *self.index.write(), resource);
    }

    fn apply_namespace(&self, ns: k8s::Namespace) {
        IndexClusterResource::apply(&mut *self.index.write(), ns);
    }

    /// Creates a service named `name` exposing port `http` 80 -> 8080, with
    /// the given ready addresses.
    fn with_backend(&self, ns: &str, name: &str, ips: &[&str]) {
        self.apply(mk_service(
            ns,
            name,
            vec![mk_port("http", 80, Some(IntOrString::Int(8080)))],
        ));
        self.apply(mk_endpoints(ns, name, ips));
    }
}

/// Reads through to the index, except that lookups of `kind` fail.
struct FailingLookup {
    index: SharedIndex,
    kind: &'static str,
}

impl FailingLookup {
    fn check(&self, kind: &'static str) -> Result<(), LookupError> {
        if self.kind == kind {
            return Err(anyhow::anyhow!("{kind} lookup failed").into());
        }
        Ok(())
    }
}

impl Lookup for FailingLookup {
    fn secret(&self, namespace: &str, name: &str) -> Result<Arc<k8s::Secret>, LookupError> {
        self.check("secret")?;
        self.index.secret(namespace, name)
    }

    fn service(&self, namespace: &str, name: &str) -> Result<Arc<k8s::Service>, LookupError> {
        self.check("service")?;
        self.index.service(namespace, name)
    }

    fn endpoints(&self, namespace: &str, name: &str) -> Result<Arc<k8s::Endpoints>, LookupError> {
        self.check("endpoints")?;
        self.index.endpoints(namespace, name)
    }

    fn namespace(&self, name: &str) -> Result<Arc<k8s::Namespace>, LookupError> {
        self.check("namespace")?;
        self.index.namespace(name)
    }
}

fn ready(translation: Translation) -> Translated {
    match translation.result {
        Ok(Outcome::Ready(translated)) => translated,
        Ok(Outcome::NotReady) => panic!("translation must be ready"),
        Err(error) => panic!("translation must succeed: {error}"),
    }
}

fn mk_meta(ns: &str, name: &str) -> k8s::ObjectMeta {
    k8s::ObjectMeta {
        namespace: Some(ns.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn mk_ingress(ns: &str, name: &str, rules: Vec<IngressRule>) -> k8s::Ingress {
    k8s::Ingress {
        metadata: mk_meta(ns, name),
        spec: IngressSpec {
            rules,
            ..Default::default()
        },
    }
}

fn mk_rule(host: &str, visibility: Visibility, paths: Vec<HttpIngressPath>) -> IngressRule {
    IngressRule {
        hosts: vec![host.to_string()],
        visibility,
        http: HttpIngressRuleValue { paths },
    }
}

fn mk_path(path: &str, splits: Vec<IngressBackendSplit>) -> HttpIngressPath {
    HttpIngressPath {
        path: path.to_string(),
        splits,
        ..Default::default()
    }
}

fn mk_split(ns: &str, name: &str, port: i32, percent: u32) -> IngressBackendSplit {
    IngressBackendSplit {
        service_namespace: ns.to_string(),
        service_name: name.to_string(),
        service_port: IntOrString::Int(port),
        percent,
        append_headers: Default::default(),
    }
}

/// An ingress with a single rule routing `/` to `ns/backend`.
fn mk_simple_ingress(visibility: Visibility) -> k8s::Ingress {
    mk_ingress(
        "ns",
        "ing",
        vec![mk_rule(
            "svc.ns.example.com",
            visibility,
            vec![mk_path("/", vec![mk_split("ns", "backend", 80, 100)])],
        )],
    )
}

fn mk_port(name: &str, port: i32, target: Option<IntOrString>) -> k8s::ServicePort {
    k8s::ServicePort {
        name: Some(name.to_string()),
        port,
        target_port: target,
        ..Default::default()
    }
}

fn mk_service(ns: &str, name: &str, ports: Vec<k8s::ServicePort>) -> k8s::Service {
    k8s::Service {
        metadata: mk_meta(ns, name),
        spec: Some(k8s::ServiceSpec {
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn mk_endpoints(ns: &str, name: &str, ips: &[&str]) -> k8s::Endpoints {
    k8s::Endpoints {
        metadata: mk_meta(ns, name),
        subsets: Some(vec![EndpointSubset {
            addresses: Some(
                ips.iter()
                    .map(|ip| EndpointAddress {
                        ip: ip.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn mk_secret(ns: &str, name: &str, data: BTreeMap<&str, &[u8]>) -> k8s::Secret {
    k8s::Secret {
        metadata: mk_meta(ns, name),
        data: Some(
            data.into_iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}

fn mk_namespace(name: &str, annotations: BTreeMap<String, String>) -> k8s::Namespace {
    k8s::Namespace {
        metadata: k8s::ObjectMeta {
            name: Some(name.to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn end_to_end() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let translated = ready(test.translate(&mk_simple_ingress(Visibility::ExternalIp)));

    assert_eq!(translated.name, crate::NamespacedName::new("ns", "ing"));
    assert_eq!(translated.listener_port, None);
    assert!(translated.sni_matches.is_empty());

    assert_eq!(translated.clusters.len(), 1);
    let cluster = &translated.clusters[0];
    assert_eq!(cluster.name, "ns/backend");
    assert_eq!(cluster.discovery_type, DiscoveryType::Static);
    assert_eq!(cluster.connect_timeout, std::time::Duration::from_secs(5));
    assert!(!cluster.http2);
    assert!(cluster.transport_socket.is_none());
    let endpoints = cluster
        .endpoints()
        .iter()
        .map(|ep| ep.address.to_string())
        .collect::<Vec<_>>();
    assert_eq!(endpoints, ["10.0.0.5:8080"]);

    assert_eq!(translated.internal_virtual_hosts.len(), 1);
    assert_eq!(translated.external_virtual_hosts.len(), 1);
    assert!(translated.external_tls_virtual_hosts.is_empty());
    assert_eq!(
        translated.internal_virtual_hosts,
        translated.external_virtual_hosts
    );

    let vhost = &translated.external_virtual_hosts[0];
    assert_eq!(vhost.name, "(ns/ing).Rules[0]");
    assert_eq!(vhost.domains, ["svc.ns.example.com", "svc.ns.example.com:*"]);
    assert!(vhost.ext_authz.is_none());
    assert_eq!(vhost.routes.len(), 1);

    let route = &vhost.routes[0];
    assert_eq!(route.name, "(ns/ing).Rules[0].Paths[/]");
    assert_eq!(route.kind(), RouteKind::Normal);
    assert_eq!(route.r#match.prefix, "/");
    assert!(route.r#match.headers.is_empty());
    let weighted = route.weighted_clusters();
    assert_eq!(weighted.len(), 1);
    assert_eq!(weighted[0].name, "ns/backend");
    assert_eq!(weighted[0].weight, 100);
}

#[test]
fn unnamed_ingress_is_translated() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let mut ingress = mk_simple_ingress(Visibility::ExternalIp);
    ingress.metadata.name = None;
    let translated = ready(test.translate(&ingress));

    assert_eq!(translated.name, crate::NamespacedName::new("ns", ""));
    assert_eq!(translated.clusters.len(), 1);
    assert_eq!(translated.external_virtual_hosts[0].name, "(ns/).Rules[0]");
}

#[test]
fn cluster_local_rules_are_internal_only() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);
    test.with_backend("ns", "private", &["10.0.0.6"]);

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![
            mk_rule(
                "public.example.com",
                Visibility::ExternalIp,
                vec![mk_path("/", vec![mk_split("ns", "backend", 80, 100)])],
            ),
            mk_rule(
                "private.ns.svc.cluster.local",
                Visibility::ClusterLocal,
                vec![mk_path("/", vec![mk_split("ns", "private", 80, 100)])],
            ),
        ],
    );
    let translated = ready(test.translate(&ingress));

    let names = |hosts: &[ingress_translator_core::VirtualHost]| {
        hosts.iter().map(|h| h.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(
        names(&translated.internal_virtual_hosts),
        ["(ns/ing).Rules[0]", "(ns/ing).Rules[1]"]
    );
    assert_eq!(
        names(&translated.external_virtual_hosts),
        ["(ns/ing).Rules[0]"]
    );
    assert!(translated.external_tls_virtual_hosts.is_empty());

    let clusters = translated
        .clusters
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(clusters, ["ns/backend", "ns/private"]);
}

#[test]
fn missing_service_is_not_ready() {
    let test = TestConfig::default();

    let translation = test.translate(&mk_simple_ingress(Visibility::ExternalIp));
    assert_eq!(
        translation.references,
        [
            Reference::new(TrackedKind::Service, "ns", "backend"),
            Reference::new(TrackedKind::Endpoints, "ns", "backend"),
        ]
    );
    assert!(matches!(translation.result, Ok(Outcome::NotReady)));

    // Both objects are tracked so that the ingress is retranslated once
    // they are created.
    let owner = crate::NamespacedName::new("ns", "ing");
    assert_eq!(test.tracker.get(&owner).len(), 2);

    test.with_backend("ns", "backend", &["10.0.0.5"]);
    let translation = test.translate(&mk_simple_ingress(Visibility::ExternalIp));
    assert!(matches!(translation.result, Ok(Outcome::Ready(_))));
}

#[test]
fn missing_endpoints_is_not_ready() {
    let test = TestConfig::default();
    test.apply(mk_service(
        "ns",
        "backend",
        vec![mk_port("http", 80, Some(IntOrString::Int(8080)))],
    ));

    let translation = test.translate(&mk_simple_ingress(Visibility::ExternalIp));
    assert!(matches!(translation.result, Ok(Outcome::NotReady)));
}

#[test]
fn any_unready_split_defers_the_whole_ingress() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![
            mk_rule(
                "a.example.com",
                Visibility::ExternalIp,
                vec![mk_path("/", vec![mk_split("ns", "backend", 80, 100)])],
            ),
            mk_rule(
                "b.example.com",
                Visibility::ExternalIp,
                vec![mk_path(
                    "/",
                    vec![
                        mk_split("ns", "backend", 80, 50),
                        mk_split("ns", "missing", 80, 50),
                    ],
                )],
            ),
        ],
    );
    let translation = test.translate(&ingress);
    assert!(matches!(translation.result, Ok(Outcome::NotReady)));

    // Registration stops at the first unready split.
    assert_eq!(
        translation.references.last(),
        Some(&Reference::new(TrackedKind::Endpoints, "ns", "missing"))
    );
}

#[test]
fn rule_without_routes_is_not_ready() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![
            mk_rule(
                "a.example.com",
                Visibility::ExternalIp,
                vec![mk_path("/", vec![mk_split("ns", "backend", 80, 100)])],
            ),
            mk_rule(
                "b.example.com",
                Visibility::ExternalIp,
                vec![mk_path("/", vec![])],
            ),
        ],
    );
    let translation = test.translate(&ingress);
    assert!(matches!(translation.result, Ok(Outcome::NotReady)));
}

#[test]
fn paths_without_splits_are_skipped() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![mk_rule(
            "a.example.com",
            Visibility::ExternalIp,
            vec![
                mk_path("/empty", vec![]),
                mk_path("", vec![mk_split("ns", "backend", 80, 100)]),
            ],
        )],
    );
    let translated = ready(test.translate(&ingress));
    let routes = &translated.internal_virtual_hosts[0].routes;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].r#match.prefix, "/", "empty paths default to /");
    assert_eq!(routes[0].name, "(ns/ing).Rules[0].Paths[/]");
}

#[test]
fn order_is_preserved() {
    let test = TestConfig::default();
    for name in ["a", "b", "c"] {
        test.with_backend("ns", name, &["10.0.0.5"]);
    }

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![mk_rule(
            "a.example.com",
            Visibility::ExternalIp,
            vec![
                mk_path("/c", vec![mk_split("ns", "c", 80, 100)]),
                mk_path(
                    "/",
                    vec![mk_split("ns", "b", 80, 90), mk_split("ns", "a", 80, 10)],
                ),
            ],
        )],
    );
    let translation = test.translate(&ingress);
    let references = translation
        .references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(
        references,
        [
            "Service.v1 ns/c",
            "Endpoints.v1 ns/c",
            "Service.v1 ns/b",
            "Endpoints.v1 ns/b",
            "Service.v1 ns/a",
            "Endpoints.v1 ns/a",
        ]
    );

    let translated = ready(translation);
    let clusters = translated
        .clusters
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(clusters, ["ns/c", "ns/b", "ns/a"]);

    let routes = &translated.internal_virtual_hosts[0].routes;
    assert_eq!(routes[0].r#match.prefix, "/c");
    assert_eq!(routes[1].r#match.prefix, "/");
    let weights = routes[1]
        .weighted_clusters()
        .iter()
        .map(|wc| (wc.name.as_str(), wc.weight))
        .collect::<Vec<_>>();
    assert_eq!(weights, [("ns/b", 90), ("ns/a", 10)]);
}

#[test]
fn clusters_are_not_deduplicated() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let ingress = mk_ingress(
        "ns",
        "ing",
        vec![mk_rule(
            "a.example.com",
            Visibility::ExternalIp,
            vec![
                mk_path("/a", vec![mk_split("ns", "backend", 80, 100)]),
                mk_path("/b", vec![mk_split("ns", "backend", 80, 100)]),
            ],
        )],
    );
    let translated = ready(test.translate(&ingress));
    assert_eq!(translated.clusters.len(), 2);
    assert_eq!(translated.clusters[0], translated.clusters[1]);
}

#[test]
fn translation_is_repeatable() {
    let test = TestConfig::default();
    test.with_backend("ns", "backend", &["10.0.0.5"]);

    let ingress = mk_simple_ingress(Visibility::ExternalIp);
    let first = ready(test.translate(&ingress));
    let second = ready(test.translate(&ingress));
    assert_eq!(first, second);
}
