#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use ingress_translator_core as core;
pub use ingress_translator_k8s as translate;
pub use ingress_translator_k8s_api as k8s;

mod args;
mod load;

pub use self::args::Args;
