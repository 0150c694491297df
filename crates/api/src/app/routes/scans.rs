use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/replenishment", post(run_replenishment))
        .route("/cycle-count", post(run_cycle_count))
        .route("/cycle-count/runs", get(list_runs))
}

pub async fn run_replenishment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
) -> axum::response::Response {
    let tasks = match services
        .scanner
        .scan_replenishment(tenant.tenant_id(), actor.actor())
    {
        Ok(tasks) => tasks,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "created": tasks.len(),
            "tasks": tasks.iter().map(dto::task_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn run_cycle_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CycleCountScanRequest>,
) -> axum::response::Response {
    let scan = match services.scanner.scan_cycle_count(
        tenant.tenant_id(),
        actor.actor(),
        body.warehouse_id,
        body.strategy,
        body.limit,
    ) {
        Ok(scan) => scan,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "run": dto::run_to_json(&scan.run),
            "tasks": scan.tasks.iter().map(dto::task_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn list_runs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .scanner
        .list_runs(tenant.tenant_id())
        .iter()
        .map(dto::run_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
