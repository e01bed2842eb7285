//! Virtual-machine records

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Power state of a virtual machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    Running,
    Stopped,
    Suspended,
    Unknown,
}

impl PowerState {
    /// Map the upstream power-state string onto the closed set
    ///
    /// Accepts both the upstream constants (`POWERED_ON`) and the
    /// already-normalised names (`running`).
    #[must_use]
    pub fn from_upstream(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "POWERED_ON" | "RUNNING" => Self::Running,
            "POWERED_OFF" | "STOPPED" => Self::Stopped,
            "SUSPENDED" => Self::Suspended,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Suspended => "suspended",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment environment inferred from the VM naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    Production,
    Sandbox,
    Development,
    Unknown,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Production => "production",
            Self::Sandbox => "sandbox",
            Self::Development => "development",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary record returned by the VM listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VmSummary {
    /// Upstream-assigned identifier (e.g. `vm-42`)
    pub id: String,
    /// Display name
    pub name: String,
    pub power_state: PowerState,
    pub cpu_count: u32,
    #[serde(rename = "memory_size_MiB")]
    pub memory_size_mib: u64,
    pub environment: Environment,
    /// Guest OS label, when the upstream reported one
    pub guest_os: Option<String>,
    /// Physical host name or a placement sentinel
    pub host: String,
    /// Cluster name or a placement sentinel
    pub cluster: String,
    /// Hardware compatibility code (e.g. `VMX_21`)
    pub compatibility_code: String,
    /// Human description of the compatibility code
    pub compatibility_human: String,
    /// Connected network names, never empty
    pub networks: Vec<String>,
}

/// Detailed record for a single VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VmDetail {
    #[serde(flatten)]
    pub summary: VmSummary,
    pub ip_addresses: Vec<String>,
    /// Disk capacities formatted as whole gigabytes (`"20 GB"`)
    pub disks: Vec<String>,
    /// NIC labels (`"Network adapter 1"`)
    pub nics: Vec<String>,
}
