//! Upstream wire types
//!
//! The REST API wraps every payload in `{"value": ...}` and is loose about
//! field presence, so nearly everything here is optional. Callers decide what a
//! missing field means.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Session
// ============================================================================

/// Short-lived REST session token
///
/// Sent as the `vmware-api-session-id` header on every authenticated call.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// `{"value": ...}` envelope used by every REST response
#[derive(Debug, Clone, Deserialize)]
pub struct ValueEnvelope<T> {
    pub value: T,
}

// ============================================================================
// Virtual machines (REST)
// ============================================================================

/// Entry of the VM listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVmListItem {
    /// VM identifier (e.g. `vm-42`)
    pub vm: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub power_state: Option<String>,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default, rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
}

/// A field the upstream sends either as a nested object or as something else
///
/// Any JSON object lands in `Nested`; scalars, arrays and nulls land in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybeNested<T> {
    Nested(T),
    Other(Value),
}

/// Nested CPU block of the VM summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCpu {
    #[serde(default)]
    pub count: Option<u32>,
}

/// Nested memory block of the VM summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMemory {
    #[serde(default, rename = "size_MiB")]
    pub size_mib: Option<u64>,
}

/// `{"key": ..., "value": ...}` pair used for disks and NICs
///
/// Only the value is read; the key's type varies between upstream versions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Keyed<T> {
    #[serde(default)]
    pub value: T,
}

/// Virtual disk as embedded in the VM summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDisk {
    /// Capacity in bytes; only integral values are meaningful
    #[serde(default)]
    pub capacity: Option<Value>,
}

/// Network backing of a NIC
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNicBacking {
    /// Resolved network name, when the upstream includes it
    #[serde(default)]
    pub network_name: Option<String>,
    /// Network identifier to resolve separately
    #[serde(default)]
    pub network: Option<String>,
}

/// Virtual NIC, from the summary or the ethernet-adapter listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNic {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub backing: RawNicBacking,
}

/// Per-VM summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVmInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub power_state: Option<String>,
    #[serde(default, rename = "guest_OS")]
    pub guest_os: Option<String>,
    #[serde(default)]
    pub cpu: Option<MaybeNested<RawCpu>>,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default)]
    pub memory: Option<MaybeNested<RawMemory>>,
    #[serde(default, rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
    #[serde(default)]
    pub disks: Vec<Keyed<RawDisk>>,
    #[serde(default)]
    pub nics: Vec<Keyed<RawNic>>,
}

/// Per-VM hardware block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHardware {
    /// Compatibility code (e.g. `VMX_21`)
    #[serde(default)]
    pub version: Option<String>,
}

/// Guest OS full name: localized message object or plain string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FullName {
    Localized {
        #[serde(default)]
        default_message: Option<String>,
    },
    Plain(String),
    Other(Value),
}

/// Guest IP address: a single string or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IpAddresses {
    One(String),
    Many(Vec<String>),
    Other(Value),
}

impl IpAddresses {
    /// Flatten into a list, dropping shapes that carry no addresses
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            IpAddresses::One(ip) => vec![ip],
            IpAddresses::Many(ips) => ips,
            IpAddresses::Other(_) => Vec::new(),
        }
    }
}

/// Guest identity as reported by the guest tools
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGuestIdentity {
    #[serde(default)]
    pub full_name: Option<FullName>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip_address: Option<IpAddresses>,
}

// ============================================================================
// Networks (REST)
// ============================================================================

/// Entry of the network listing
#[derive(Debug, Clone, Deserialize)]
pub struct RawNetworkItem {
    /// Network identifier (e.g. `network-12`, `dvportgroup-33`)
    pub network: String,
    pub name: String,
}

/// Single-network detail
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNetworkInfo {
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// Object graph (SOAP)
// ============================================================================

/// Reference to a managed object (`HostSystem:host-10`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagedObjectRef {
    /// Managed object type (`VirtualMachine`, `HostSystem`, ...)
    pub kind: String,
    /// Managed object id (`vm-42`)
    pub value: String,
}

impl ManagedObjectRef {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ManagedObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// A VM together with the host it currently runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmHostBinding {
    pub vm: ManagedObjectRef,
    /// `None` when the VM is not placed (e.g. orphaned)
    pub host: Option<ManagedObjectRef>,
}

/// `name` and `parent` of a managed entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityProperties {
    pub name: Option<String>,
    pub parent: Option<ManagedObjectRef>,
}
