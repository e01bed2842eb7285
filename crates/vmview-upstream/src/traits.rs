//! Upstream contracts

use async_trait::async_trait;
use vmview_api::PowerAction;

use crate::error::Result;
use crate::types::{
    EntityProperties, ManagedObjectRef, RawGuestIdentity, RawHardware, RawNetworkInfo,
    RawNetworkItem, RawNic, RawVmInfo, RawVmListItem, SessionToken, VmHostBinding,
};

/// Session-token REST management API
///
/// Every call is one round trip bounded by a per-call timeout; a timeout fails
/// like any other transport error.
#[async_trait]
pub trait VcenterApi: Send + Sync {
    /// Exchange the configured credentials for a session token
    async fn create_session(&self) -> Result<SessionToken>;

    /// List all visible VMs
    async fn list_vms(&self, session: &SessionToken) -> Result<Vec<RawVmListItem>>;

    /// Per-VM summary
    async fn vm_info(&self, session: &SessionToken, vm_id: &str) -> Result<RawVmInfo>;

    /// Per-VM hardware block (compatibility version)
    async fn vm_hardware(&self, session: &SessionToken, vm_id: &str) -> Result<RawHardware>;

    /// Per-VM ethernet adapters
    async fn vm_ethernet(&self, session: &SessionToken, vm_id: &str) -> Result<Vec<RawNic>>;

    /// Guest identity reported by the guest tools
    async fn vm_guest_identity(
        &self,
        session: &SessionToken,
        vm_id: &str,
    ) -> Result<RawGuestIdentity>;

    /// Issue a power operation
    async fn vm_power(
        &self,
        session: &SessionToken,
        vm_id: &str,
        action: PowerAction,
    ) -> Result<()>;

    /// List all networks
    async fn list_networks(&self, session: &SessionToken) -> Result<Vec<RawNetworkItem>>;

    /// Single-network detail
    async fn network_info(&self, session: &SessionToken, network_id: &str)
    -> Result<RawNetworkInfo>;
}

/// Connection factory for the stateful object-graph protocol
#[async_trait]
pub trait ObjectGraph: Send + Sync {
    /// Open and authenticate a new connection
    ///
    /// The returned session must be released with
    /// [`ObjectGraphSession::disconnect`] on every exit path.
    async fn connect(&self) -> Result<Box<dyn ObjectGraphSession>>;
}

/// An open, authenticated object-graph connection
#[async_trait]
pub trait ObjectGraphSession: Send + Sync {
    /// Enumerate every visible VM with its runtime host
    async fn vm_hosts(&self) -> Result<Vec<VmHostBinding>>;

    /// Read `name` and `parent` of a managed entity
    async fn entity_properties(&self, entity: &ManagedObjectRef) -> Result<EntityProperties>;

    /// Release the connection and its upstream session
    async fn disconnect(&self) -> Result<()>;
}
