//! Pure mapping from upstream shapes to record fields
//!
//! Nothing here performs I/O, so every rule can be tested in isolation.

use vmview_api::Environment;
use vmview_upstream::types::{MaybeNested, RawDisk, RawVmInfo};

use crate::sentinel::{NO_DATA, UNKNOWN_GUEST_OS};

/// Hardware compatibility codes and their human descriptions
pub const COMPATIBILITY_TABLE: &[(&str, &str)] = &[
    ("VMX_03", "ESXi 2.5 and later (VM version 3)"),
    ("VMX_04", "ESXi 3.0 and later (VM version 4)"),
    ("VMX_06", "ESXi 4.0 and later (VM version 6)"),
    ("VMX_07", "ESXi 4.0 and later (VM version 7)"),
    ("VMX_08", "ESXi 5.0 and later (VM version 8)"),
    ("VMX_09", "ESXi 5.1 and later (VM version 9)"),
    ("VMX_10", "ESXi 5.5 and later (VM version 10)"),
    ("VMX_11", "ESXi 6.0 and later (VM version 11)"),
    ("VMX_12", "ESXi 6.5 and later (VM version 12)"),
    ("VMX_13", "ESXi 6.5 and later (VM version 13)"),
    ("VMX_14", "ESXi 6.7 and later (VM version 14)"),
    ("VMX_15", "ESXi 6.7 U2 and later (VM version 15)"),
    ("VMX_16", "ESXi 7.0 and later (VM version 16)"),
    ("VMX_17", "ESXi 7.0 and later (VM version 17)"),
    ("VMX_18", "ESXi 7.0 U1 and later (VM version 18)"),
    ("VMX_19", "ESXi 7.0 U2 and later (VM version 19)"),
    ("VMX_20", "ESXi 8.0 and later (VM version 20)"),
    ("VMX_21", "ESXi 8.0 U2 and later (VM version 21)"),
];

const GIB: u64 = 1 << 30;

/// Infer the environment from the VM name prefix
///
/// Case-insensitive, checked in fixed order: `T-`, `P-`, `S`, `D-`.
#[must_use]
pub fn infer_environment(name: &str) -> Environment {
    let upper = name.to_uppercase();
    if upper.starts_with("T-") {
        Environment::Test
    } else if upper.starts_with("P-") {
        Environment::Production
    } else if upper.starts_with('S') {
        Environment::Sandbox
    } else if upper.starts_with("D-") {
        Environment::Development
    } else {
        Environment::Unknown
    }
}

/// Human description of a compatibility code; unknown codes map to themselves
#[must_use]
pub fn describe_compatibility(code: &str) -> String {
    COMPATIBILITY_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map_or_else(|| code.to_string(), |(_, human)| (*human).to_string())
}

/// Compatibility code from the hardware block, or the no-data sentinel
#[must_use]
pub fn compatibility_code(version: Option<&str>) -> String {
    version
        .filter(|v| !v.is_empty())
        .unwrap_or(NO_DATA)
        .to_string()
}

/// CPU count and memory size (MiB) from a VM summary
///
/// A nested `cpu`/`memory` object takes priority; otherwise the flat
/// `cpu_count`/`memory_size_MiB` fields are used. Missing values are zero.
#[must_use]
pub fn normalize_resources(info: &RawVmInfo) -> (u32, u64) {
    let cpu = match &info.cpu {
        Some(MaybeNested::Nested(cpu)) => cpu.count.unwrap_or(0),
        _ => info.cpu_count.unwrap_or(0),
    };
    let memory = match &info.memory {
        Some(MaybeNested::Nested(memory)) => memory.size_mib.unwrap_or(0),
        _ => info.memory_size_mib.unwrap_or(0),
    };
    (cpu, memory)
}

/// Format a byte capacity as whole gigabytes (floor division by 2^30)
#[must_use]
pub fn format_disk_capacity(bytes: u64) -> String {
    format!("{} GB", bytes / GIB)
}

/// Disk sizes of every disk reporting an integral capacity
pub fn disk_sizes<'a>(disks: impl IntoIterator<Item = &'a RawDisk>) -> Vec<String> {
    disks
        .into_iter()
        .filter_map(|disk| disk.capacity.as_ref().and_then(serde_json::Value::as_u64))
        .map(format_disk_capacity)
        .collect()
}

/// Display name for a VM, substituting a placeholder for empty names
#[must_use]
pub fn display_name(name: Option<&str>, vm_id: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => crate::sentinel::unnamed_vm(vm_id),
    }
}

/// Guest OS label for VM detail
///
/// Priority: identity full name, identity short name, summary OS field, then
/// the `unknown` sentinel. Empty strings count as absent.
#[must_use]
pub fn guest_os_label(
    full_name: Option<&str>,
    identity_name: Option<&str>,
    summary_os: Option<&str>,
) -> String {
    [full_name, identity_name, summary_os]
        .into_iter()
        .flatten()
        .find(|label| !label.is_empty())
        .unwrap_or(UNKNOWN_GUEST_OS)
        .to_string()
}

/// Final tier of the network fallback chain: never return an empty list
#[must_use]
pub fn with_network_placeholder(networks: Vec<String>) -> Vec<String> {
    if networks.is_empty() {
        vec![NO_DATA.to_string()]
    } else {
        networks
    }
}
