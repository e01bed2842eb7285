//! Network identifier to name resolution
//!
//! Two tiers: a bulk snapshot of every network, then a per-id point lookup for
//! ids the snapshot does not know. Both tiers degrade instead of failing, and
//! both cache their degraded results for the full TTL.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use vmview_upstream::types::RawNicBacking;
use vmview_upstream::{SessionToken, VcenterApi};

use crate::cache::TtlCache;
use crate::config::CachePolicy;
use crate::resolution::Resolution;
use crate::sentinel::{NETWORK_ERROR, NO_NAME};

/// Bulk id -> name snapshot
pub type NetworkMap = Arc<HashMap<String, String>>;

const MAP_KEY: &str = "net_map";

pub struct NetworkResolver {
    api: Arc<dyn VcenterApi>,
    map_cache: TtlCache<&'static str, Resolution<NetworkMap>>,
    name_cache: TtlCache<String, Resolution<String>>,
}

impl NetworkResolver {
    pub fn new(api: Arc<dyn VcenterApi>, policy: &CachePolicy) -> Self {
        Self {
            api,
            map_cache: TtlCache::new("network_map", policy.network_list_capacity, policy.ttl()),
            name_cache: TtlCache::new("network_name", policy.network_capacity, policy.ttl()),
        }
    }

    /// Load the bulk network map
    ///
    /// A failed listing yields an empty map, cached like a real one.
    #[instrument(skip(self, session))]
    pub async fn load_map(&self, session: &SessionToken) -> Resolution<NetworkMap> {
        if let Some(cached) = self.map_cache.get(MAP_KEY).await {
            debug!("network map cache hit");
            return cached;
        }

        let resolution = match self.api.list_networks(session).await {
            Ok(items) => {
                let map: HashMap<String, String> = items
                    .into_iter()
                    .map(|item| (item.network, item.name))
                    .collect();
                debug!(count = map.len(), "network map loaded");
                Resolution::Resolved(Arc::new(map))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    "network listing failed, using empty map"
                );
                Resolution::Fallback(Arc::new(HashMap::new()))
            }
        };

        self.map_cache.put(MAP_KEY, resolution.clone()).await;
        resolution
    }

    /// Resolve a single network id by point lookup
    ///
    /// Yields `<error>` when the lookup fails and `<no name>` when it succeeds
    /// without a name.
    #[instrument(skip(self, session))]
    pub async fn resolve_one(&self, network_id: &str, session: &SessionToken) -> Resolution<String> {
        if let Some(cached) = self.name_cache.get(network_id).await {
            return cached;
        }

        let resolution = match self.api.network_info(session, network_id).await {
            Ok(info) => match info.name {
                Some(name) => Resolution::Resolved(name),
                None => Resolution::Fallback(NO_NAME.to_string()),
            },
            Err(e) => {
                warn!(network_id, error = %e, timeout = e.is_timeout(), "network lookup failed");
                Resolution::Fallback(NETWORK_ERROR.to_string())
            }
        };

        self.name_cache
            .put(network_id.to_string(), resolution.clone())
            .await;
        resolution
    }

    /// Name of the network behind a NIC backing
    ///
    /// Order: the name embedded in the backing, the bulk map, then a point
    /// lookup. `None` when the backing carries neither a name nor an id.
    pub async fn resolve_backing(
        &self,
        backing: &RawNicBacking,
        map: &HashMap<String, String>,
        session: &SessionToken,
    ) -> Option<String> {
        if let Some(name) = backing.network_name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }

        let network_id = backing.network.as_deref().filter(|id| !id.is_empty())?;
        if let Some(name) = map.get(network_id).filter(|n| !n.is_empty()) {
            return Some(name.clone());
        }

        Some(self.resolve_one(network_id, session).await.into_inner())
    }

    /// Network names for a set of NIC backings, skipping unusable ones
    pub async fn resolve_nics(
        &self,
        backings: &[&RawNicBacking],
        map: &HashMap<String, String>,
        session: &SessionToken,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for backing in backings {
            if let Some(name) = self.resolve_backing(backing, map, session).await {
                names.push(name);
            }
        }
        names
    }

    pub async fn clear(&self) {
        self.map_cache.clear().await;
        self.name_cache.clear().await;
    }
}
