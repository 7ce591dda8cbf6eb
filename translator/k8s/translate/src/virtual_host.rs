use crate::{lookup::Lookup, tracker::Tracker, translate::Context};
use ingress_translator_core::{Route, VirtualHost};
use ingress_translator_k8s_api::{IngressRule, ResourceExt};
use std::collections::BTreeMap;

/// Identifies this translator to the external authorization service.
const EXT_AUTHZ_CLIENT: &str = "ingress-translator";

/// The virtual hosts produced for a single rule.
#[derive(Debug)]
pub(crate) struct RuleHosts {
    pub(crate) plain: VirtualHost,
    pub(crate) tls: Option<VirtualHost>,
}

/// Returns the domains a rule's virtual host answers for.
///
/// Each host is listed both bare and with a port wildcard, since clients
/// (notably gRPC) may include the port in the request authority.
pub fn domains_for_rule(rule: &IngressRule) -> Vec<String> {
    rule.hosts
        .iter()
        .flat_map(|host| [host.clone(), format!("{host}:*")])
        .collect()
}

impl<L: Lookup, T: Tracker> Context<'_, L, T> {
    pub(crate) fn virtual_hosts(
        &self,
        rule_name: String,
        rule: &IngressRule,
        routes: Vec<Route>,
        tls_routes: Vec<Route>,
    ) -> RuleHosts {
        let domains = domains_for_rule(rule);
        let tls = (!tls_routes.is_empty()).then(|| (domains.clone(), tls_routes));

        if !self.ext_authz {
            return RuleHosts {
                tls: tls
                    .map(|(domains, routes)| VirtualHost::new(rule_name.clone(), domains, routes)),
                plain: VirtualHost::new(rule_name, domains, routes),
            };
        }

        let ctx = self.context_extensions(rule);
        RuleHosts {
            tls: tls.map(|(domains, routes)| {
                VirtualHost::with_ext_authz(rule_name.clone(), ctx.clone(), domains, routes)
            }),
            plain: VirtualHost::with_ext_authz(rule_name, ctx, domains, routes),
        }
    }

    /// Metadata passed to the authorization service with each request. The
    /// ingress's labels are included, but never replace the base entries.
    fn context_extensions(&self, rule: &IngressRule) -> BTreeMap<String, String> {
        let mut ctx = self.ingress.labels().clone();
        ctx.insert("client".to_string(), EXT_AUTHZ_CLIENT.to_string());
        ctx.insert("visibility".to_string(), rule.visibility.to_string());
        ctx
    }
}
