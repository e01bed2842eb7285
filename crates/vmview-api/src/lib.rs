//! vmview-api: Shared API types and schemas
//!
//! Contains the virtual-machine records, power actions and response types
//! exchanged between the inventory engine, the daemon and its clients.

pub mod requests;
pub mod responses;
pub mod vm;

pub use requests::{ParsePowerActionError, PowerAction};
pub use responses::{HealthResponse, PowerActionResponse};
pub use vm::{Environment, PowerState, VmDetail, VmSummary};
