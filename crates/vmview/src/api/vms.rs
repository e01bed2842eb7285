//! VM inventory endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;
use vmview_api::{PowerActionResponse, VmDetail, VmSummary};

use crate::api::error::{ApiError, AppError};
use crate::state::AppState;

/// Query parameters for listing VMs
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVmsQuery {
    /// Case-insensitive substring of the VM name
    #[serde(default)]
    pub name: Option<String>,
    /// Environment tag, case-insensitive; an unknown tag matches nothing
    #[serde(default)]
    pub environment: Option<String>,
}

impl ListVmsQuery {
    fn matches(&self, vm: &VmSummary) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| vm.name.to_lowercase().contains(&needle.to_lowercase()));
        let env_ok = self
            .environment
            .as_deref()
            .is_none_or(|env| vm.environment.as_str() == env.to_lowercase());
        name_ok && env_ok
    }
}

/// Detail routes accept `vm_42` as well as `vm-42`
fn normalize_vm_id(id: &str) -> String {
    id.replace('_', "-")
}

/// List all VMs
///
/// # Errors
/// Returns `AppError` if authentication or the upstream listing fails
#[utoipa::path(
    get,
    path = "/api/vms",
    tag = "VMs",
    params(ListVmsQuery),
    responses(
        (status = 200, description = "VM summaries", body = [VmSummary]),
        (status = 401, description = "Upstream rejected the credentials", body = ApiError),
        (status = 500, description = "Upstream unreachable", body = ApiError),
    ),
)]
pub async fn list_vms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVmsQuery>,
) -> Result<Json<Vec<VmSummary>>, AppError> {
    let vms = state.inventory.list_summaries().await?;
    let filtered = vms.iter().filter(|vm| query.matches(vm)).cloned().collect();
    Ok(Json(filtered))
}

/// Full detail of one VM
///
/// # Errors
/// Returns `AppError` if authentication or the VM summary lookup fails
#[utoipa::path(
    get,
    path = "/api/vms/{id}",
    tag = "VMs",
    params(("id" = String, Path, description = "VM identifier")),
    responses(
        (status = 200, description = "VM detail", body = VmDetail),
        (status = 404, description = "VM not found upstream", body = ApiError),
    ),
)]
pub async fn get_vm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VmDetail>, AppError> {
    let detail = state.inventory.get_detail(&normalize_vm_id(&id)).await?;
    Ok(Json(detail))
}

/// Start, stop or reset a VM
///
/// # Errors
/// Returns `AppError` on an unknown action or an upstream refusal
#[utoipa::path(
    post,
    path = "/api/vms/{id}/power/{action}",
    tag = "VMs",
    params(
        ("id" = String, Path, description = "VM identifier"),
        ("action" = String, Path, description = "start, stop or reset"),
    ),
    responses(
        (status = 200, description = "Action executed", body = PowerActionResponse),
        (status = 400, description = "Unknown action", body = ApiError),
    ),
)]
pub async fn power_vm(
    State(state): State<Arc<AppState>>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<PowerActionResponse>, AppError> {
    let response = state.inventory.power_action(&id, &action).await?;
    Ok(Json(response))
}
