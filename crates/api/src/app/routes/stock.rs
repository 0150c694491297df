use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use forgewms_infra::stock::Pagination;
use forgewms_infra::stock_ops::{StockAdjustment, StockMove};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(query_stock))
        .route("/move", post(move_stock))
        .route("/adjust", post(adjust_stock))
        .route("/movements", get(list_movements))
}

pub async fn query_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::StockQuery>,
) -> axum::response::Response {
    let records = match services.stock_ops.query_stock(
        tenant.tenant_id(),
        query.item_id,
        query.warehouse_id,
        query.location_id,
    ) {
        Ok(records) => records,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let items = records
        .iter()
        .map(dto::stock_record_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn move_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<StockMove>,
) -> axum::response::Response {
    let quantity = body.quantity;
    match services
        .stock_ops
        .move_stock(tenant.tenant_id(), actor.actor(), body)
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "moved": quantity })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<StockAdjustment>,
) -> axum::response::Response {
    match services
        .stock_ops
        .adjust_stock(tenant.tenant_id(), actor.actor(), body)
    {
        Ok(quantity) => (
            StatusCode::OK,
            Json(serde_json::json!({ "quantity": quantity })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::MovementQuery>,
) -> axum::response::Response {
    let defaults = Pagination::default();
    let pagination = Pagination {
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(defaults.offset),
    };

    let page = services
        .stock_ops
        .recent_movements(tenant.tenant_id(), pagination);
    (StatusCode::OK, Json(dto::movement_page_to_json(&page))).into_response()
}
