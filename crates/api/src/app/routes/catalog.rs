use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use forgewms_catalog::{ItemId, LocationId, WarehouseId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route("/items/:id", get(get_item))
        .route("/items/:id/deactivate", post(deactivate_item))
        .route("/warehouses", post(create_warehouse).get(list_warehouses))
        .route("/warehouses/:id/locations", post(create_location))
        .route("/locations", get(list_locations))
        .route("/locations/:id/policy", post(set_policy))
        .route("/policies", get(list_policies))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let item = match services.catalog.create_item(
        tenant.tenant_id(),
        body.sku,
        body.name,
        body.unit_of_measure,
        Utc::now(),
    ) {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response()
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .catalog
        .list_items(tenant.tenant_id())
        .iter()
        .map(dto::item_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.require_item(tenant.tenant_id(), item_id) {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deactivate_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.deactivate_item(tenant.tenant_id(), item_id) {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(body): Json<dto::CreateWarehouseRequest>,
) -> axum::response::Response {
    let warehouse = match services
        .catalog
        .create_warehouse(tenant.tenant_id(), body.code, body.name, Utc::now())
    {
        Ok(warehouse) => warehouse,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::warehouse_to_json(&warehouse)),
    )
        .into_response()
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .catalog
        .list_warehouses(tenant.tenant_id())
        .iter()
        .map(dto::warehouse_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    let warehouse_id: WarehouseId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let location = match services.catalog.create_location(
        tenant.tenant_id(),
        warehouse_id,
        body.code,
        body.kind,
        body.capacity,
        Utc::now(),
    ) {
        Ok(location) => location,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (StatusCode::CREATED, Json(dto::location_to_json(&location))).into_response()
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::LocationQuery>,
) -> axum::response::Response {
    let items = services
        .catalog
        .list_locations(tenant.tenant_id(), query.warehouse_id)
        .iter()
        .map(dto::location_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn set_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetPolicyRequest>,
) -> axum::response::Response {
    let location_id: LocationId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let policy = match services.catalog.set_policy(
        tenant.tenant_id(),
        location_id,
        body.min_quantity,
        body.max_quantity,
        Utc::now(),
    ) {
        Ok(policy) => policy,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (StatusCode::OK, Json(dto::policy_to_json(&policy))).into_response()
}

pub async fn list_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .catalog
        .list_policies(tenant.tenant_id())
        .iter()
        .map(dto::policy_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
