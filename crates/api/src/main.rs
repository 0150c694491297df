#[tokio::main]
async fn main() {
    forgewms_observability::init();

    let bind_addr = std::env::var("FORGEWMS_BIND_ADDR").unwrap_or_else(|_| {
        tracing::warn!("FORGEWMS_BIND_ADDR not set; defaulting to 0.0.0.0:8080");
        "0.0.0.0:8080".to_string()
    });

    let app = forgewms_api::app::build_app();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
