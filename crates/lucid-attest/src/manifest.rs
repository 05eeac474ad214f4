//! Runtime environment detection and manifest collection
//!
//! Detection and collection are pure over an env lookup so tests never
//! touch process globals; the no-suffix functions are the `std::env`-backed
//! production entry points.

use lucid_core::RuntimeType;
use std::collections::BTreeMap;
use tracing::debug;

/// Sentinel for facts the environment does not expose. Downstream
/// attestation consumers expect a stable key set per runtime type, so
/// missing facts are sentineled rather than omitted.
pub const UNKNOWN: &str = "unknown";

/// Detect the runtime type from the process environment.
///
/// Ambiguous environments fall back to kubernetes - an agent should not
/// refuse to wake up merely because its runtime type is unclear.
pub fn detect_runtime() -> RuntimeType {
    detect_runtime_from(&|key| std::env::var(key).ok())
}

pub fn detect_runtime_from(env: &dyn Fn(&str) -> Option<String>) -> RuntimeType {
    if env("KUBERNETES_SERVICE_HOST").is_some() {
        return RuntimeType::Kubernetes;
    }
    if env("AWS_LAMBDA_FUNCTION_NAME").is_some() {
        return RuntimeType::Serverless;
    }
    if env("LUCID_EDGE_DEVICE_ID").is_some() {
        return RuntimeType::Edge;
    }
    debug!("runtime type undetectable, defaulting to kubernetes");
    RuntimeType::default()
}

/// Gather the runtime-type-appropriate fact set from the process
/// environment.
pub fn collect_manifest(runtime_type: RuntimeType) -> BTreeMap<String, String> {
    collect_manifest_from(runtime_type, &|key| std::env::var(key).ok())
}

pub fn collect_manifest_from(
    runtime_type: RuntimeType,
    env: &dyn Fn(&str) -> Option<String>,
) -> BTreeMap<String, String> {
    let mut manifest = BTreeMap::new();
    match runtime_type {
        RuntimeType::Kubernetes => {
            // POD_NAME is the downward-API convention; HOSTNAME is what
            // kubelet actually guarantees.
            let pod = env("POD_NAME").or_else(|| env("HOSTNAME"));
            insert(&mut manifest, "pod_name", pod);
            insert(&mut manifest, "namespace", env("POD_NAMESPACE"));
            insert(&mut manifest, "node_name", env("NODE_NAME"));
        }
        RuntimeType::Serverless => {
            insert(&mut manifest, "function_name", env("AWS_LAMBDA_FUNCTION_NAME"));
            insert(&mut manifest, "region", env("AWS_REGION"));
        }
        RuntimeType::Edge => {
            insert(&mut manifest, "device_id", env("LUCID_EDGE_DEVICE_ID"));
            insert(&mut manifest, "location", env("LUCID_EDGE_LOCATION"));
        }
    }
    manifest
}

fn insert(manifest: &mut BTreeMap<String, String>, key: &str, value: Option<String>) {
    manifest.insert(
        key.to_string(),
        value.unwrap_or_else(|| UNKNOWN.to_string()),
    );
}
