use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use forgewms_rules::PutawayRuleId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/rules", post(create_rule).get(list_rules))
        .route("/rules/:id/deactivate", post(deactivate_rule))
        .route("/suggest", post(suggest))
}

pub async fn create_rule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CreateRuleRequest>,
) -> axum::response::Response {
    match services.putaway.create_rule(
        tenant.tenant_id(),
        actor.actor(),
        body.name,
        body.priority,
        body.criteria,
        body.target_location_id,
    ) {
        Ok(rule) => (StatusCode::CREATED, Json(dto::rule_to_json(&rule))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_rules(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    let items = services
        .putaway
        .list_rules(tenant.tenant_id())
        .iter()
        .map(dto::rule_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn deactivate_rule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let rule_id: PutawayRuleId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .putaway
        .deactivate_rule(tenant.tenant_id(), actor.actor(), rule_id)
    {
        Ok(rule) => (StatusCode::OK, Json(dto::rule_to_json(&rule))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn suggest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(body): Json<dto::SuggestPutawayRequest>,
) -> axum::response::Response {
    let suggestion = services.putaway.suggest(tenant.tenant_id(), &body.attributes);
    (
        StatusCode::OK,
        Json(dto::suggestion_to_json(&suggestion)),
    )
        .into_response()
}
