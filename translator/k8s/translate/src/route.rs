use crate::{error::TranslateError, lookup::Lookup, tracker::Tracker, translate::Context};
use ingress_translator_core::{
    route::ACME_CHALLENGE_PREFIX, Cluster, HeaderMatcher, Outcome, Route, WeightedCluster,
};
use ingress_translator_k8s_api::{HttpIngressPath, HttpOption, IngressRule};
use std::time;

/// Routes never time out; upstream timeouts are enforced by the services
/// themselves.
const ROUTE_TIMEOUT: time::Duration = time::Duration::ZERO;

/// The routes and clusters produced for a single rule.
#[derive(Debug, Default)]
pub(crate) struct RuleRoutes {
    pub(crate) routes: Vec<Route>,

    /// Routes served on TLS listeners. Empty unless the ingress terminates
    /// TLS.
    pub(crate) tls_routes: Vec<Route>,

    pub(crate) clusters: Vec<Cluster>,
}

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    /// Builds the routes for each of a rule's paths, in order.
    pub(crate) fn rule_routes(
        &mut self,
        rule_name: &str,
        rule: &IngressRule,
    ) -> Result<Outcome<RuleRoutes>, TranslateError> {
        let paths = &rule.http.paths;
        let mut out = RuleRoutes {
            routes: Vec::with_capacity(paths.len()),
            tls_routes: Vec::with_capacity(paths.len()),
            clusters: Vec::new(),
        };

        for path in paths {
            let prefix = path.path_or_default();
            let route_name = format!("{rule_name}.Paths[{prefix}]");

            let mut weighted = Vec::with_capacity(path.splits.len());
            for split in &path.splits {
                let upstream = match self.upstream(path, split)? {
                    Outcome::Ready(upstream) => upstream,
                    Outcome::NotReady => return Ok(Outcome::NotReady),
                };
                out.clusters.push(upstream.cluster);
                weighted.push(upstream.weighted);
            }

            if weighted.is_empty() {
                continue;
            }

            let (route, tls_route) = self.path_routes(&route_name, rule, path, weighted);
            out.routes.push(route);
            if let Some(tls_route) = tls_route {
                out.tls_routes.push(tls_route);
            }

            let drop_routes = self.drop_routes()?;
            for drop_path in drop_routes.paths() {
                let dropped = Route::new_drop(route_name.clone(), drop_path);
                if !out.tls_routes.is_empty() {
                    out.tls_routes.push(dropped.clone());
                }
                out.routes.push(dropped);
            }
        }

        Ok(Outcome::Ready(out))
    }

    /// Selects the route for a path, and the route served in its place on
    /// TLS listeners, if any.
    ///
    /// The ACME challenge bypass takes precedence over HTTPS redirection so
    /// that certificates can always be issued. Redirects are never served
    /// over TLS.
    fn path_routes(
        &self,
        route_name: &str,
        rule: &IngressRule,
        path: &HttpIngressPath,
        weighted: Vec<WeightedCluster>,
    ) -> (Route, Option<Route>) {
        let prefix = path.path_or_default();
        let headers = header_matchers(path);
        let forward = |bypass: bool| {
            let route = Route::new(
                route_name,
                headers.clone(),
                prefix,
                weighted.clone(),
                ROUTE_TIMEOUT,
                &path.append_headers,
                path.host_rewrite(),
            );
            if bypass {
                route.without_ext_authz()
            } else {
                route
            }
        };

        let bypass = self.ext_authz && prefix.starts_with(ACME_CHALLENGE_PREFIX);
        let route = if bypass {
            forward(true)
        } else if self.redirects(rule) {
            Route::new_redirect(route_name, headers.clone(), prefix)
        } else {
            forward(false)
        };

        let tls_route = self.serves_tls().then(|| {
            if bypass {
                route.clone()
            } else {
                forward(false)
            }
        });
        (route, tls_route)
    }

    fn redirects(&self, rule: &IngressRule) -> bool {
        self.ingress.spec.http_option == HttpOption::Redirected
            && !self.config.http_option_disabled
            && rule.visibility.is_external()
    }

    /// Indicates whether routes are duplicated for TLS listeners.
    pub(crate) fn serves_tls(&self) -> bool {
        !self.ingress.spec.tls.is_empty() || self.config.use_https_listener_with_one_cert()
    }
}

/// Builds a matcher per header. Headers without an exact value only need to
/// be present.
fn header_matchers(path: &HttpIngressPath) -> Vec<HeaderMatcher> {
    path.headers
        .iter()
        .map(|(name, m)| HeaderMatcher {
            name: name.clone(),
            exact_match: m.exact.clone().filter(|v| !v.is_empty()),
        })
        .collect()
}
