#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

fn main() -> anyhow::Result<()> {
    ingress_translator::Args::parse_and_run()
}
