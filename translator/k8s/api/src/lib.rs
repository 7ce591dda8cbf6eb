#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
pub mod ingress;

pub use self::ingress::{
    HeaderMatch, HttpIngressPath, HttpIngressRuleValue, HttpOption, Ingress, IngressBackendSplit,
    IngressRule, IngressSpec, IngressTls, Visibility,
};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{
            EndpointAddress, EndpointSubset, Endpoints, Namespace, Secret, Service, ServicePort,
            ServiceSpec,
        },
    },
    apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
    ByteString,
};
pub use kube::{Resource, ResourceExt};

/// The `Service` type that aliases an external DNS name.
pub const SERVICE_TYPE_EXTERNAL_NAME: &str = "ExternalName";

/// The secret key holding a PEM-encoded certificate chain.
pub const TLS_CERT_KEY: &str = "tls.crt";

/// The secret key holding a PEM-encoded private key.
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Returns the bytes stored under `key` in a secret, or an empty buffer if the
/// key is absent.
pub fn secret_data(secret: &Secret, key: &str) -> Vec<u8> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|ByteString(bytes)| bytes.clone())
        .unwrap_or_default()
}
