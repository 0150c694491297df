use axum::{routing::get, Router};

pub mod audit;
pub mod campaigns;
pub mod catalog;
pub mod inbound;
pub mod outbound;
pub mod putaway;
pub mod scans;
pub mod stock;
pub mod system;
pub mod tasks;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/catalog", catalog::router())
        .nest("/inbound", inbound::router())
        .nest("/outbound", outbound::router())
        .nest("/stock", stock::router())
        .nest("/campaigns", campaigns::router())
        .nest("/tasks", tasks::router())
        .nest("/scans", scans::router())
        .nest("/putaway", putaway::router())
        .nest("/audit", audit::router())
}
