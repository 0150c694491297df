use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use forgewms_counting::CampaignId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(open_campaign).get(list_campaigns))
        .route("/:id", get(get_campaign))
        .route("/:id/lines", post(record_lines))
        .route("/:id/close", post(close_campaign))
}

pub async fn open_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::OpenCampaignRequest>,
) -> axum::response::Response {
    match services
        .counting
        .open_campaign(tenant.tenant_id(), actor.actor(), body.warehouse_id)
    {
        Ok(campaign) => (
            StatusCode::CREATED,
            Json(dto::campaign_to_json(&campaign)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_campaigns(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .counting
        .list_campaigns(tenant.tenant_id())
        .iter()
        .map(dto::campaign_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let campaign_id: CampaignId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.counting.get_campaign(tenant.tenant_id(), campaign_id) {
        Ok(campaign) => (StatusCode::OK, Json(dto::campaign_to_json(&campaign))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn record_lines(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordCountsRequest>,
) -> axum::response::Response {
    let campaign_id: CampaignId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.counting.record_lines(
        tenant.tenant_id(),
        actor.actor(),
        campaign_id,
        body.lines,
    ) {
        Ok(campaign) => (StatusCode::OK, Json(dto::campaign_to_json(&campaign))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn close_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let campaign_id: CampaignId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .counting
        .close_campaign(tenant.tenant_id(), actor.actor(), campaign_id)
    {
        Ok(campaign) => (StatusCode::OK, Json(dto::campaign_to_json(&campaign))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
