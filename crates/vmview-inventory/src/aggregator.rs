//! Inventory aggregation
//!
//! Stitches REST summaries, hardware, network backing, guest identity and
//! object-graph placement into [`VmSummary`] and [`VmDetail`] records.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use vmview_api::{PowerAction, PowerActionResponse, PowerState, VmDetail, VmSummary};
use vmview_upstream::types::{RawNic, RawNicBacking, RawVmInfo, RawVmListItem};
use vmview_upstream::{ObjectGraph, SessionToken, VcenterApi};

use crate::cache::TtlCache;
use crate::config::CachePolicy;
use crate::error::InventoryError;
use crate::identity::GuestIdentityResolver;
use crate::network::NetworkResolver;
use crate::normalize::{
    compatibility_code, describe_compatibility, disk_sizes, display_name, guest_os_label,
    infer_environment, normalize_resources, with_network_placeholder,
};
use crate::placement::PlacementResolver;
use crate::session::SessionProvider;

const SUMMARIES_KEY: &str = "vms";

/// Composes the resolvers into listing, detail and power operations
pub struct InventoryAggregator {
    api: Arc<dyn VcenterApi>,
    sessions: SessionProvider,
    networks: NetworkResolver,
    placements: PlacementResolver,
    identities: GuestIdentityResolver,
    /// Whole assembled listing, one slot
    summaries: TtlCache<&'static str, Arc<Vec<VmSummary>>>,
}

impl InventoryAggregator {
    /// Create an aggregator over the two upstreams
    ///
    /// Every cache instance is sized from `policy`.
    pub fn new(api: Arc<dyn VcenterApi>, graph: Arc<dyn ObjectGraph>, policy: &CachePolicy) -> Self {
        Self {
            sessions: SessionProvider::new(Arc::clone(&api)),
            networks: NetworkResolver::new(Arc::clone(&api), policy),
            placements: PlacementResolver::new(graph, policy),
            identities: GuestIdentityResolver::new(Arc::clone(&api), policy),
            summaries: TtlCache::new("vm_list", policy.vm_list_capacity, policy.ttl()),
            api,
        }
    }

    /// Summaries of every visible VM
    ///
    /// A cached listing is returned verbatim. Otherwise the whole list is
    /// rebuilt; per-VM enrichment failures degrade that VM's fields and never
    /// drop it from the result.
    ///
    /// # Errors
    /// Fails when authentication or the VM listing itself fails.
    #[instrument(skip(self))]
    pub async fn list_summaries(&self) -> Result<Arc<Vec<VmSummary>>, InventoryError> {
        if let Some(cached) = self.summaries.get(SUMMARIES_KEY).await {
            debug!(count = cached.len(), "VM list cache hit");
            return Ok(cached);
        }

        let session = self.sessions.authenticate().await?;
        let map = self.networks.load_map(&session).await;
        if map.is_fallback() {
            debug!("listing without network map");
        }
        let map = map.into_inner();

        let raw = self.api.list_vms(&session).await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "VM listing failed");
            InventoryError::Upstream(e)
        })?;

        let mut summaries = Vec::with_capacity(raw.len());
        for item in raw {
            summaries.push(self.build_summary(item, &map, &session).await);
        }

        let summaries = Arc::new(summaries);
        self.summaries.put(SUMMARIES_KEY, Arc::clone(&summaries)).await;
        info!(count = summaries.len(), "VM list assembled");
        Ok(summaries)
    }

    async fn build_summary(
        &self,
        item: RawVmListItem,
        map: &HashMap<String, String>,
        session: &SessionToken,
    ) -> VmSummary {
        let vm_id = item.vm;
        let name = display_name(item.name.as_deref(), &vm_id);

        let info = match self.api.vm_info(session, &vm_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(
                    vm_id = %vm_id,
                    error = %e,
                    timeout = e.is_timeout(),
                    "VM summary unavailable"
                );
                None
            }
        };

        let code = self.compatibility(&vm_id, session).await;
        let placement = self.placements.resolve_placement(&vm_id).await;
        if placement.is_fallback() {
            debug!(vm_id = %vm_id, host = %placement.value().host, "placement degraded");
        }
        let placement = placement.into_inner();
        let networks = self
            .resolve_networks(&vm_id, info.as_ref(), map, session)
            .await;

        VmSummary {
            environment: infer_environment(&name),
            power_state: item
                .power_state
                .as_deref()
                .map_or(PowerState::Unknown, PowerState::from_upstream),
            cpu_count: item.cpu_count.unwrap_or(0),
            memory_size_mib: item.memory_size_mib.unwrap_or(0),
            guest_os: info.and_then(|info| info.guest_os),
            host: placement.host,
            cluster: placement.cluster,
            compatibility_human: describe_compatibility(&code),
            compatibility_code: code,
            networks,
            name,
            id: vm_id,
        }
    }

    /// Full record for one VM, assembled on every call
    ///
    /// # Errors
    /// Fails when authentication or the VM's own summary lookup fails.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, vm_id: &str) -> Result<VmDetail, InventoryError> {
        let session = self.sessions.authenticate().await?;

        let info = self.api.vm_info(&session, vm_id).await.map_err(|e| {
            warn!(vm_id, error = %e, timeout = e.is_timeout(), "VM summary lookup failed");
            InventoryError::not_found(&e)
        })?;

        let code = self.compatibility(vm_id, &session).await;
        let name = display_name(info.name.as_deref(), vm_id);
        let (cpu_count, memory_size_mib) = normalize_resources(&info);
        let map = self.networks.load_map(&session).await.into_inner();
        let placement = self.placements.resolve_placement(vm_id).await.into_inner();

        let disks = disk_sizes(info.disks.iter().map(|disk| &disk.value));
        let nics = info
            .nics
            .iter()
            .filter_map(|nic| nic.value.label.clone())
            .filter(|label| !label.is_empty())
            .collect();
        let networks = self
            .resolve_networks(vm_id, Some(&info), &map, &session)
            .await;

        let identity = self
            .identities
            .resolve_identity(vm_id, &session)
            .await
            .into_inner();
        let guest_os = guest_os_label(
            identity.full_name.as_deref(),
            identity.name.as_deref(),
            info.guest_os.as_deref(),
        );

        debug!(vm_id, "VM detail assembled");
        Ok(VmDetail {
            summary: VmSummary {
                id: vm_id.to_string(),
                environment: infer_environment(&name),
                name,
                power_state: info
                    .power_state
                    .as_deref()
                    .map_or(PowerState::Unknown, PowerState::from_upstream),
                cpu_count,
                memory_size_mib,
                guest_os: Some(guest_os),
                host: placement.host,
                cluster: placement.cluster,
                compatibility_human: describe_compatibility(&code),
                compatibility_code: code,
                networks,
            },
            ip_addresses: identity.ip_addresses,
            disks,
            nics,
        })
    }

    /// Validate and issue a power operation
    ///
    /// The action name is checked before any upstream call is made.
    ///
    /// # Errors
    /// Fails on an unknown action, on authentication failure, or when the
    /// upstream refuses the operation.
    pub async fn power_action(
        &self,
        vm_id: &str,
        action: &str,
    ) -> Result<PowerActionResponse, InventoryError> {
        let action: PowerAction = action
            .parse()
            .map_err(|_| InventoryError::InvalidAction(action.to_string()))?;
        self.power(vm_id, action).await
    }

    /// Issue an already-validated power operation
    ///
    /// # Errors
    /// Fails on authentication failure or when the upstream refuses the
    /// operation.
    #[instrument(skip(self))]
    pub async fn power(
        &self,
        vm_id: &str,
        action: PowerAction,
    ) -> Result<PowerActionResponse, InventoryError> {
        let session = self.sessions.authenticate().await?;

        self.api
            .vm_power(&session, vm_id, action)
            .await
            .map_err(|e| {
                warn!(vm_id, %action, error = %e, timeout = e.is_timeout(), "power action failed");
                InventoryError::action(&e)
            })?;

        info!(vm_id, %action, "power action executed");
        Ok(PowerActionResponse {
            message: format!("action '{action}' executed on VM {vm_id}"),
        })
    }

    /// Drop every cached entry in every resolver
    pub async fn clear_all_caches(&self) {
        self.summaries.clear().await;
        self.networks.clear().await;
        self.placements.clear().await;
        self.identities.clear().await;
    }

    /// Hardware compatibility code, or the no-data sentinel
    async fn compatibility(&self, vm_id: &str, session: &SessionToken) -> String {
        match self.api.vm_hardware(session, vm_id).await {
            Ok(hardware) => compatibility_code(hardware.version.as_deref()),
            Err(e) => {
                warn!(vm_id, error = %e, timeout = e.is_timeout(), "hardware lookup failed");
                compatibility_code(None)
            }
        }
    }

    /// Connected network names
    ///
    /// Ethernet adapters first, then NICs embedded in the VM summary, then the
    /// single `<no data>` placeholder.
    async fn resolve_networks(
        &self,
        vm_id: &str,
        info: Option<&RawVmInfo>,
        map: &HashMap<String, String>,
        session: &SessionToken,
    ) -> Vec<String> {
        let adapters: Vec<RawNic> = match self.api.vm_ethernet(session, vm_id).await {
            Ok(adapters) => adapters,
            Err(e) => {
                warn!(
                    vm_id,
                    error = %e,
                    timeout = e.is_timeout(),
                    "ethernet adapter lookup failed"
                );
                Vec::new()
            }
        };
        let backings: Vec<&RawNicBacking> = adapters.iter().map(|nic| &nic.backing).collect();
        let mut networks = self.networks.resolve_nics(&backings, map, session).await;

        if networks.is_empty()
            && let Some(info) = info
        {
            let embedded: Vec<&RawNicBacking> =
                info.nics.iter().map(|nic| &nic.value.backing).collect();
            networks = self.networks.resolve_nics(&embedded, map, session).await;
        }

        with_network_placeholder(networks)
    }
}
