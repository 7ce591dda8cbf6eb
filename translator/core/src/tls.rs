//! TLS termination (SNI matches) and upstream TLS origination (transport
//! sockets).
//!
//! The upstream TLS context messages are a subset of the proxy's
//! `envoy.extensions.transport_sockets.tls.v3` API. Field numbers match the
//! upstream protobuf definitions so the encoded `Any` is understood by the
//! proxy as-is.

use crate::NamespacedName;
use prost::Message;

/// The well-known name of the TLS transport socket.
pub const TRANSPORT_SOCKET_TLS: &str = "envoy.transport_sockets.tls";

pub const UPSTREAM_TLS_CONTEXT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext";

/// Pairs a set of server names with the certificate that is presented for
/// them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SniMatch {
    pub hosts: Vec<String>,
    pub cert_source: NamespacedName,
    pub certificate_chain: Vec<u8>,
    pub private_key: Vec<u8>,
}

/// Wraps a typed transport socket configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportSocket {
    pub name: String,
    pub typed_config: prost_types::Any,
}

#[derive(Clone, PartialEq, Message)]
pub struct UpstreamTlsContext {
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: Option<CommonTlsContext>,

    #[prost(string, tag = "2")]
    pub sni: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CommonTlsContext {
    #[prost(message, optional, tag = "1")]
    pub tls_params: Option<TlsParameters>,

    #[prost(oneof = "common_tls_context::ValidationContextType", tags = "3")]
    pub validation_context_type: Option<common_tls_context::ValidationContextType>,

    #[prost(string, repeated, tag = "4")]
    pub alpn_protocols: Vec<String>,
}

pub mod common_tls_context {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum ValidationContextType {
        #[prost(message, tag = "3")]
        ValidationContext(super::CertificateValidationContext),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct TlsParameters {
    #[prost(enumeration = "TlsProtocol", tag = "1")]
    pub tls_minimum_protocol_version: i32,

    #[prost(enumeration = "TlsProtocol", tag = "2")]
    pub tls_maximum_protocol_version: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TlsProtocol {
    Auto = 0,
    Tlsv10 = 1,
    Tlsv11 = 2,
    Tlsv12 = 3,
    Tlsv13 = 4,
}

#[derive(Clone, PartialEq, Message)]
pub struct CertificateValidationContext {
    #[prost(message, optional, tag = "1")]
    pub trusted_ca: Option<DataSource>,

    #[prost(message, repeated, tag = "9")]
    pub match_subject_alt_names: Vec<StringMatcher>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DataSource {
    #[prost(oneof = "data_source::Specifier", tags = "1, 2, 3")]
    pub specifier: Option<data_source::Specifier>,
}

pub mod data_source {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Specifier {
        #[prost(string, tag = "1")]
        Filename(String),
        #[prost(bytes, tag = "2")]
        InlineBytes(Vec<u8>),
        #[prost(string, tag = "3")]
        InlineString(String),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct StringMatcher {
    #[prost(oneof = "string_matcher::MatchPattern", tags = "1, 2, 3")]
    pub match_pattern: Option<string_matcher::MatchPattern>,

    #[prost(bool, tag = "6")]
    pub ignore_case: bool,
}

pub mod string_matcher {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum MatchPattern {
        #[prost(string, tag = "1")]
        Exact(String),
        #[prost(string, tag = "2")]
        Prefix(String),
        #[prost(string, tag = "3")]
        Suffix(String),
    }
}

// === impl UpstreamTlsContext ===

impl UpstreamTlsContext {
    /// Builds a client context that requires at least TLSv1.2, trusts only
    /// `ca_certificate` and expects the peer to present `subject_alt_name`.
    pub fn new(
        ca_certificate: Vec<u8>,
        subject_alt_name: impl Into<String>,
        alpn_protocols: Vec<String>,
    ) -> Self {
        Self {
            common_tls_context: Some(CommonTlsContext {
                tls_params: Some(TlsParameters {
                    tls_minimum_protocol_version: TlsProtocol::Tlsv12.into(),
                    tls_maximum_protocol_version: TlsProtocol::Auto.into(),
                }),
                validation_context_type: Some(
                    common_tls_context::ValidationContextType::ValidationContext(
                        CertificateValidationContext {
                            trusted_ca: Some(DataSource {
                                specifier: Some(data_source::Specifier::InlineBytes(
                                    ca_certificate,
                                )),
                            }),
                            match_subject_alt_names: vec![StringMatcher {
                                match_pattern: Some(string_matcher::MatchPattern::Exact(
                                    subject_alt_name.into(),
                                )),
                                ignore_case: false,
                            }],
                        },
                    ),
                ),
                alpn_protocols,
            }),
            sni: String::new(),
        }
    }
}

// === impl TransportSocket ===

impl TransportSocket {
    /// Wraps an upstream TLS context in the generic transport socket envelope.
    pub fn upstream_tls(ctx: &UpstreamTlsContext) -> Result<Self, prost::EncodeError> {
        let mut value = Vec::with_capacity(ctx.encoded_len());
        ctx.encode(&mut value)?;
        Ok(Self {
            name: TRANSPORT_SOCKET_TLS.to_string(),
            typed_config: prost_types::Any {
                type_url: UPSTREAM_TLS_CONTEXT_TYPE_URL.to_string(),
                value,
            },
        })
    }

    /// Decodes the upstream TLS context carried by this socket, if any.
    pub fn upstream_tls_context(&self) -> Option<UpstreamTlsContext> {
        if self.typed_config.type_url != UPSTREAM_TLS_CONTEXT_TYPE_URL {
            return None;
        }
        UpstreamTlsContext::decode(self.typed_config.value.as_slice()).ok()
    }
}
