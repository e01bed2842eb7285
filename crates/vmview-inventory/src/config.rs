//! Cache sizing and lifetime policy

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capacity and TTL for every cache instance
///
/// Each resolver receives its slice of this at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Time-to-live shared by all instances, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Slots for the assembled VM list
    #[serde(default = "default_single")]
    pub vm_list_capacity: usize,
    /// Per-VM guest identities
    #[serde(default = "default_identity_capacity")]
    pub identity_capacity: usize,
    /// Per-network point lookups
    #[serde(default = "default_network_capacity")]
    pub network_capacity: usize,
    /// Slots for the bulk network map
    #[serde(default = "default_single")]
    pub network_list_capacity: usize,
    /// Per-VM host/cluster placements
    #[serde(default = "default_placement_capacity")]
    pub placement_capacity: usize,
}

impl CachePolicy {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            vm_list_capacity: default_single(),
            identity_capacity: default_identity_capacity(),
            network_capacity: default_network_capacity(),
            network_list_capacity: default_single(),
            placement_capacity: default_placement_capacity(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_single() -> usize {
    1
}

fn default_identity_capacity() -> usize {
    1000
}

fn default_network_capacity() -> usize {
    2000
}

fn default_placement_capacity() -> usize {
    2000
}
