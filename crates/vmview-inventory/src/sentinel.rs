//! Placeholder values substituted when upstream data is unavailable

/// Field the upstream did not provide (compatibility code, network list)
pub const NO_DATA: &str = "<no data>";

/// Single-network lookup failed
pub const NETWORK_ERROR: &str = "<error>";

/// Single-network lookup succeeded without a name
pub const NO_NAME: &str = "<no name>";

/// VM not found in the object graph, or not placed on a host
pub const UNKNOWN_HOST: &str = "unknown host";
pub const UNKNOWN_CLUSTER: &str = "unknown cluster";

/// Object-graph placement lookup failed
pub const ERROR_HOST: &str = "error host";
pub const ERROR_CLUSTER: &str = "error cluster";

/// Guest OS label of last resort in VM detail
pub const UNKNOWN_GUEST_OS: &str = "unknown";

/// Display name for a VM listed without one
#[must_use]
pub fn unnamed_vm(vm_id: &str) -> String {
    format!("<unnamed {vm_id}>")
}
