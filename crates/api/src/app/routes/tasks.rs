use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use forgewms_infra::tasks::TaskStore;
use forgewms_tasks::{Task, TaskId, TaskKind};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route("/stats", get(task_stats))
        .route("/:id/assign", post(assign_task))
        .route("/:id/start", post(start_task))
        .route("/:id/complete", post(complete_task))
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(body): Json<dto::CreateTaskRequest>,
) -> axum::response::Response {
    if body.kind.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "task kind must not be empty",
        );
    }

    let mut task = Task::new(
        tenant.tenant_id(),
        TaskKind::custom(body.kind),
        body.metadata,
    );
    if let Some(priority) = body.priority {
        task = task.with_priority(priority);
    }

    match services.tasks.enqueue(task.clone()) {
        Ok(_) => (StatusCode::CREATED, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::task_store_error_to_response(e),
    }
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::TaskQuery>,
) -> axum::response::Response {
    let tasks = match services.tasks.list(
        tenant.tenant_id(),
        query.status,
        query.limit.unwrap_or(100),
    ) {
        Ok(tasks) => tasks,
        Err(e) => return errors::task_store_error_to_response(e),
    };

    let items = tasks.iter().map(dto::task_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn task_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    match services.tasks.stats(tenant.tenant_id()) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => errors::task_store_error_to_response(e),
    }
}

pub async fn assign_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AssignTaskRequest>,
) -> axum::response::Response {
    let task_id: TaskId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .tasks
        .assign(tenant.tenant_id(), task_id, body.assignee)
    {
        Ok(task) => (StatusCode::OK, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::task_store_error_to_response(e),
    }
}

pub async fn start_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let task_id: TaskId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.tasks.start(tenant.tenant_id(), task_id) {
        Ok(task) => (StatusCode::OK, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::task_store_error_to_response(e),
    }
}

pub async fn complete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let task_id: TaskId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.tasks.complete(tenant.tenant_id(), task_id) {
        Ok(task) => (StatusCode::OK, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::task_store_error_to_response(e),
    }
}
