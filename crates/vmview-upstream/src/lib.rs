//! vmview-upstream: clients for the virtualization-management upstream
//!
//! Two protocols are spoken here:
//!
//! - the session-token REST management API ([`RestClient`], behind the
//!   [`VcenterApi`] trait), and
//! - the stateful vim25 SOAP object graph ([`SoapClient`], behind the
//!   [`ObjectGraph`] / [`ObjectGraphSession`] traits), used only for host and
//!   cluster placement.
//!
//! The traits are the seam the inventory engine is written against, so tests can
//! substitute in-memory fakes.
//!
//! # Example
//!
//! ```no_run
//! use vmview_upstream::{Credentials, RestClient, VcenterApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RestClient::new(
//!     "https://vcenter.example.com",
//!     Credentials::new("svc-inventory", "secret"),
//! )?;
//! let session = client.create_session().await?;
//! let vms = client.list_vms(&session).await?;
//! println!("{} VMs", vms.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod rest;
pub mod soap;
pub mod traits;
pub mod types;

pub use error::{Result, UpstreamError};
pub use rest::{Credentials, RestClient, Timeouts};
pub use soap::SoapClient;
pub use traits::{ObjectGraph, ObjectGraphSession, VcenterApi};
pub use types::SessionToken;
