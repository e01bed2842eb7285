//! API route handlers

pub mod error;
pub mod system;
pub mod vms;

use utoipa::OpenApi;
use vmview_api::{
    Environment, HealthResponse, PowerActionResponse, PowerState, VmDetail, VmSummary,
};

pub use error::ApiError;

/// OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vmview",
        description = "Aggregated virtual-machine inventory"
    ),
    tags(
        (name = "System", description = "Daemon health"),
        (name = "VMs", description = "Inventory listing, detail and power actions")
    ),
    paths(system::health, vms::list_vms, vms::get_vm, vms::power_vm),
    components(schemas(
        ApiError,
        Environment,
        HealthResponse,
        PowerActionResponse,
        PowerState,
        VmDetail,
        VmSummary
    ))
)]
pub struct ApiDoc;
