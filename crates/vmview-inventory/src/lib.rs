//! vmview-inventory: aggregation and caching engine for VM inventory
//!
//! This crate resolves VM records by composing several upstream lookups:
//! - REST summaries, hardware and ethernet adapters
//! - Network names (bulk map plus per-id point lookups)
//! - Host/cluster placement over the object graph
//! - Guest OS identity
//!
//! Each resolver owns a bounded [`TtlCache`]. Enrichment lookups degrade to
//! sentinel values ([`Resolution::Fallback`]) instead of failing; only
//! authentication, the VM listing and a VM's own summary are load-bearing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vmview_inventory::{CachePolicy, InventoryAggregator};
//! use vmview_upstream::{Credentials, RestClient, SoapClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("svc-inventory", "secret");
//! let rest = RestClient::new("https://vcenter.example.com", credentials.clone())?;
//! let soap = SoapClient::new("vcenter.example.com", 443, credentials)?;
//!
//! let inventory = InventoryAggregator::new(Arc::new(rest), Arc::new(soap), &CachePolicy::default());
//! for vm in inventory.list_summaries().await?.iter() {
//!     println!("{} on {}", vm.name, vm.host);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod network;
pub mod normalize;
pub mod placement;
pub mod resolution;
pub mod sentinel;
pub mod session;

pub use aggregator::InventoryAggregator;
pub use cache::TtlCache;
pub use config::CachePolicy;
pub use error::InventoryError;
pub use identity::{GuestIdentity, GuestIdentityResolver};
pub use network::{NetworkMap, NetworkResolver};
pub use placement::{Placement, PlacementResolver};
pub use resolution::Resolution;
pub use session::SessionProvider;
