use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::dto;

pub fn router() -> Router {
    Router::new().route("/", get(list_audit))
}

pub async fn list_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::AuditQuery>,
) -> axum::response::Response {
    let items = services
        .audit
        .for_tenant(tenant.tenant_id(), query.limit.unwrap_or(100))
        .iter()
        .map(dto::audit_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
