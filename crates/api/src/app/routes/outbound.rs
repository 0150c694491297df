use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use forgewms_outbound::OutboundOrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/picks", post(pick))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CreateOutboundOrderRequest>,
) -> axum::response::Response {
    let order = match services.shipping.create_order(
        tenant.tenant_id(),
        actor.actor(),
        body.reference,
        body.customer,
        body.warehouse_id,
        body.expected_date,
        body.lines,
    ) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::outbound_order_to_json(&order)),
    )
        .into_response()
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .shipping
        .list_orders(tenant.tenant_id())
        .iter()
        .map(dto::outbound_order_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OutboundOrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.shipping.get_order(tenant.tenant_id(), order_id) {
        Ok(order) => (StatusCode::OK, Json(dto::outbound_order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn pick(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PickRequest>,
) -> axum::response::Response {
    let order_id: OutboundOrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .shipping
        .pick(tenant.tenant_id(), actor.actor(), order_id, body.picks)
    {
        Ok(order) => (StatusCode::OK, Json(dto::outbound_order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
