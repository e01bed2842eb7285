//! Host and cluster placement over the object graph

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use vmview_upstream::types::ManagedObjectRef;
use vmview_upstream::{ObjectGraph, ObjectGraphSession, UpstreamError};

use crate::cache::TtlCache;
use crate::config::CachePolicy;
use crate::resolution::Resolution;
use crate::sentinel::{ERROR_CLUSTER, ERROR_HOST, UNKNOWN_CLUSTER, UNKNOWN_HOST};

/// Physical host and cluster a VM runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub host: String,
    pub cluster: String,
}

impl Placement {
    pub fn new(host: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            cluster: cluster.into(),
        }
    }

    /// VM not found, or found without a host
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_HOST, UNKNOWN_CLUSTER)
    }

    /// The object graph could not be queried
    #[must_use]
    pub fn error() -> Self {
        Self::new(ERROR_HOST, ERROR_CLUSTER)
    }
}

pub struct PlacementResolver {
    graph: Arc<dyn ObjectGraph>,
    cache: TtlCache<String, Resolution<Placement>>,
}

impl PlacementResolver {
    pub fn new(graph: Arc<dyn ObjectGraph>, policy: &CachePolicy) -> Self {
        Self {
            graph,
            cache: TtlCache::new("placement", policy.placement_capacity, policy.ttl()),
        }
    }

    /// Resolve where a VM runs
    ///
    /// Never fails: an unreachable object graph yields the error pair, which is
    /// cached for the full TTL like any other answer.
    #[instrument(skip(self))]
    pub async fn resolve_placement(&self, vm_id: &str) -> Resolution<Placement> {
        if let Some(cached) = self.cache.get(vm_id).await {
            debug!("placement cache hit");
            return cached;
        }

        let resolution = match self.lookup(vm_id).await {
            Ok(Some(placement)) => Resolution::Resolved(placement),
            Ok(None) => Resolution::Fallback(Placement::unknown()),
            Err(e) => {
                warn!(vm_id, error = %e, timeout = e.is_timeout(), "placement lookup failed");
                Resolution::Fallback(Placement::error())
            }
        };

        self.cache.put(vm_id.to_string(), resolution.clone()).await;
        resolution
    }

    /// One connection per lookup, released on every exit path
    async fn lookup(&self, vm_id: &str) -> Result<Option<Placement>, UpstreamError> {
        let session = self.graph.connect().await?;
        let result = locate(session.as_ref(), vm_id).await;

        if let Err(e) = session.disconnect().await {
            warn!(vm_id, error = %e, timeout = e.is_timeout(), "object graph disconnect failed");
        }

        result
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

/// Find the VM's host, then the host's parent cluster
async fn locate(
    session: &dyn ObjectGraphSession,
    vm_id: &str,
) -> Result<Option<Placement>, UpstreamError> {
    let bindings = session.vm_hosts().await?;
    let Some(binding) = bindings.into_iter().find(|b| b.vm.value == vm_id) else {
        debug!(vm_id, "VM not present in object graph");
        return Ok(None);
    };
    let Some(host_ref) = binding.host else {
        return Ok(None);
    };

    let host = session.entity_properties(&host_ref).await?;
    let cluster_name = match &host.parent {
        Some(parent) => cluster_name(session, parent).await?,
        None => UNKNOWN_CLUSTER.to_string(),
    };
    let host_name = host.name.unwrap_or_else(|| UNKNOWN_HOST.to_string());

    Ok(Some(Placement::new(host_name, cluster_name)))
}

async fn cluster_name(
    session: &dyn ObjectGraphSession,
    parent: &ManagedObjectRef,
) -> Result<String, UpstreamError> {
    let properties = session.entity_properties(parent).await?;
    Ok(properties
        .name
        .unwrap_or_else(|| UNKNOWN_CLUSTER.to_string()))
}
