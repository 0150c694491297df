use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use forgewms_inbound::InboundOrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/receipts", post(receive))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CreateInboundOrderRequest>,
) -> axum::response::Response {
    let order = match services.receiving.create_order(
        tenant.tenant_id(),
        actor.actor(),
        body.reference,
        body.supplier,
        body.warehouse_id,
        body.expected_date,
        body.lines,
    ) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::inbound_order_to_json(&order)),
    )
        .into_response()
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .receiving
        .list_orders(tenant.tenant_id())
        .iter()
        .map(dto::inbound_order_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: InboundOrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.receiving.get_order(tenant.tenant_id(), order_id) {
        Ok(order) => (StatusCode::OK, Json(dto::inbound_order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn receive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReceiveRequest>,
) -> axum::response::Response {
    let order_id: InboundOrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.receiving.receive(
        tenant.tenant_id(),
        actor.actor(),
        order_id,
        body.receipts,
    ) {
        Ok(order) => (StatusCode::OK, Json(dto::inbound_order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
