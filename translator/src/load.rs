use crate::{k8s, translate::SharedIndex};
use anyhow::{bail, Context, Result};
use kubert::index::{IndexClusterResource, IndexNamespacedResource};
use serde_json::Value;
use std::path::Path;

pub(crate) fn read_ingress(path: &Path) -> Result<k8s::Ingress> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("invalid ingress in {}", path.display()))
}

/// Applies the resources in a JSON file, either a single object or a `List`,
/// to the index. Returns the number of objects applied.
pub(crate) fn apply_resources(index: &SharedIndex, path: &Path) -> Result<usize> {
    let value = read_json(path)?;
    let items = match value.get("kind").and_then(Value::as_str) {
        Some("List") => match value.get("items") {
            Some(Value::Array(items)) => items.clone(),
            _ => bail!("{}: list has no items", path.display()),
        },
        _ => vec![value],
    };

    let count = items.len();
    for item in items {
        apply(index, item).with_context(|| format!("invalid resource in {}", path.display()))?;
    }
    Ok(count)
}

fn apply(index: &SharedIndex, value: Value) -> Result<()> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    tracing::trace!(%kind, "loading resource");

    let mut index = index.write();
    match kind.as_str() {
        "Secret" => {
            let secret = serde_json::from_value::<k8s::Secret>(value)?;
            IndexNamespacedResource::apply(&mut *index, secret);
        }
        "Service" => {
            let service = serde_json::from_value::<k8s::Service>(value)?;
            IndexNamespacedResource::apply(&mut *index, service);
        }
        "Endpoints" => {
            let endpoints = serde_json::from_value::<k8s::Endpoints>(value)?;
            IndexNamespacedResource::apply(&mut *index, endpoints);
        }
        "Namespace" => {
            let ns = serde_json::from_value::<k8s::Namespace>(value)?;
            IndexClusterResource::apply(&mut *index, ns);
        }
        kind => bail!("unsupported resource kind: {kind:?}"),
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let file = std::fs::File::open(path).with_context(|| format!("{}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("{}: invalid JSON", path.display()))
}
