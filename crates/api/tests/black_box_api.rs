use forgewms_core::{TenantId, UserId};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = forgewms_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Clone, Copy)]
struct Identity {
    tenant_id: TenantId,
    actor: UserId,
}

impl Identity {
    fn new() -> Self {
        Self {
            tenant_id: TenantId::new(),
            actor: UserId::new(),
        }
    }
}

fn with_identity(req: reqwest::RequestBuilder, identity: &Identity) -> reqwest::RequestBuilder {
    req.header("X-Tenant-Id", identity.tenant_id.to_string())
        .header("X-Actor-Id", identity.actor.to_string())
}

async fn post_created(
    client: &reqwest::Client,
    identity: &Identity,
    url: String,
    body: serde_json::Value,
) -> serde_json::Value {
    let res = with_identity(client.post(url), identity)
        .json(&body)
        .send()
        .await
        .unwrap();
    if res.status() != StatusCode::CREATED {
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        panic!("expected 201 Created, got {status} body={text}");
    }
    res.json().await.unwrap()
}

/// Create warehouse + receiving dock + pick face + one item; returns
/// (warehouse_id, dock_id, pick_face_id, item_id).
async fn seed_topology(
    client: &reqwest::Client,
    base_url: &str,
    identity: &Identity,
) -> (String, String, String, String) {
    let warehouse = post_created(
        client,
        identity,
        format!("{}/catalog/warehouses", base_url),
        json!({ "code": "WH-1", "name": "Main" }),
    )
    .await;
    let warehouse_id = warehouse["id"].as_str().unwrap().to_string();

    let dock = post_created(
        client,
        identity,
        format!("{}/catalog/warehouses/{}/locations", base_url, warehouse_id),
        json!({ "code": "DOCK-1", "kind": "receiving" }),
    )
    .await;
    let dock_id = dock["id"].as_str().unwrap().to_string();

    let pick_face = post_created(
        client,
        identity,
        format!("{}/catalog/warehouses/{}/locations", base_url, warehouse_id),
        json!({ "code": "A-01-01", "kind": "picking" }),
    )
    .await;
    let pick_face_id = pick_face["id"].as_str().unwrap().to_string();

    let item = post_created(
        client,
        identity,
        format!("{}/catalog/items", base_url),
        json!({ "sku": "WID-1", "name": "Widget", "unit_of_measure": "EA" }),
    )
    .await;
    let item_id = item["id"].as_str().unwrap().to_string();

    (warehouse_id, dock_id, pick_face_id, item_id)
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Health stays public.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn identity_is_derived_from_headers() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();

    let client = reqwest::Client::new();
    let res = with_identity(client.get(format!("{}/whoami", srv.base_url)), &identity)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["tenant_id"].as_str().unwrap(),
        identity.tenant_id.to_string()
    );
    assert_eq!(
        body["actor_id"].as_str().unwrap(),
        identity.actor.to_string()
    );
}

#[tokio::test]
async fn malformed_identity_header_is_unauthorized() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .header("X-Tenant-Id", "not-a-uuid")
        .header("X-Actor-Id", UserId::new().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inbound_to_stock_lifecycle() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();
    let client = reqwest::Client::new();

    let (warehouse_id, dock_id, _pick_face_id, item_id) =
        seed_topology(&client, &srv.base_url, &identity).await;

    // Create an inbound order with one line expecting 10.
    let order = post_created(
        &client,
        &identity,
        format!("{}/inbound", srv.base_url),
        json!({
            "reference": "PO-1001",
            "supplier": "Acme",
            "warehouse_id": warehouse_id,
            "lines": [{ "item_id": item_id, "expected_quantity": 10 }],
        }),
    )
    .await;
    assert_eq!(order["status"], "open");
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    // Receive the full quantity into the dock.
    let res = with_identity(
        client.post(format!("{}/inbound/{}/receipts", srv.base_url, order_id)),
        &identity,
    )
    .json(&json!({
        "receipts": [{ "line_id": line_id, "quantity": 10, "to_location_id": dock_id }],
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let received: serde_json::Value = res.json().await.unwrap();
    assert_eq!(received["status"], "closed");
    assert_eq!(received["lines"][0]["received_quantity"], 10);
    assert_eq!(received["lines"][0]["is_complete"], true);

    // The balance is queryable.
    let res = with_identity(
        client.get(format!("{}/stock?item_id={}", srv.base_url, item_id)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stock: serde_json::Value = res.json().await.unwrap();
    let items = stock["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 10);
    assert_eq!(items[0]["location_id"].as_str().unwrap(), dock_id);

    // The journal shows exactly one receipt.
    let res = with_identity(
        client.get(format!("{}/stock/movements", srv.base_url)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["kind"], "receipt");
    assert_eq!(page["items"][0]["quantity"], 10);
    assert_eq!(
        page["items"][0]["actor"].as_str().unwrap(),
        identity.actor.to_string()
    );
}

#[tokio::test]
async fn pick_beyond_available_is_rejected() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();
    let client = reqwest::Client::new();

    let (warehouse_id, _dock_id, pick_face_id, item_id) =
        seed_topology(&client, &srv.base_url, &identity).await;

    // Seed 3 on the pick face.
    let res = with_identity(client.post(format!("{}/stock/adjust", srv.base_url)), &identity)
        .json(&json!({
            "item_id": item_id,
            "location_id": pick_face_id,
            "delta": 3,
            "reason": "initial stock",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let order = post_created(
        &client,
        &identity,
        format!("{}/outbound", srv.base_url),
        json!({
            "reference": "SO-2001",
            "customer": "Globex",
            "warehouse_id": warehouse_id,
            "lines": [{ "item_id": item_id, "ordered_quantity": 5 }],
        }),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    // Pick 5 where only 3 exist: rejected, nothing moves.
    let res = with_identity(
        client.post(format!("{}/outbound/{}/picks", srv.base_url, order_id)),
        &identity,
    )
    .json(&json!({
        "picks": [{ "line_id": line_id, "quantity": 5, "from_location_id": pick_face_id }],
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    let res = with_identity(
        client.get(format!("{}/stock?item_id={}", srv.base_url, item_id)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stock["items"][0]["quantity"], 3);
}

#[tokio::test]
async fn campaign_close_freezes_recording() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();
    let client = reqwest::Client::new();

    let (warehouse_id, _dock_id, pick_face_id, item_id) =
        seed_topology(&client, &srv.base_url, &identity).await;

    let res = with_identity(client.post(format!("{}/stock/adjust", srv.base_url)), &identity)
        .json(&json!({
            "item_id": item_id,
            "location_id": pick_face_id,
            "delta": 10,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let campaign = post_created(
        &client,
        &identity,
        format!("{}/campaigns", srv.base_url),
        json!({ "warehouse_id": warehouse_id }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap().to_string();

    // Count 7 against a system quantity of 10.
    let res = with_identity(
        client.post(format!("{}/campaigns/{}/lines", srv.base_url, campaign_id)),
        &identity,
    )
    .json(&json!({
        "lines": [{ "item_id": item_id, "location_id": pick_face_id, "counted_quantity": 7 }],
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let recorded: serde_json::Value = res.json().await.unwrap();
    assert_eq!(recorded["lines"][0]["system_quantity"], 10);
    assert_eq!(recorded["lines"][0]["difference"], -3);

    let res = with_identity(
        client.post(format!("{}/campaigns/{}/close", srv.base_url, campaign_id)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let closed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(closed["status"], "closed");

    // Recording against a closed campaign is an invalid state, not a 404.
    let res = with_identity(
        client.post(format!("{}/campaigns/{}/lines", srv.base_url, campaign_id)),
        &identity,
    )
    .json(&json!({
        "lines": [{ "item_id": item_id, "location_id": pick_face_id, "counted_quantity": 9 }],
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn tenant_isolation_blocks_cross_tenant_reads() {
    let srv = TestServer::spawn().await;
    let tenant_a = Identity::new();
    let tenant_b = Identity::new();
    let client = reqwest::Client::new();

    let (warehouse_id, dock_id, _pick_face_id, item_id) =
        seed_topology(&client, &srv.base_url, &tenant_a).await;

    let order = post_created(
        &client,
        &tenant_a,
        format!("{}/inbound", srv.base_url),
        json!({
            "reference": "PO-3001",
            "warehouse_id": warehouse_id,
            "lines": [{ "item_id": item_id, "expected_quantity": 4 }],
        }),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    let res = with_identity(
        client.post(format!("{}/inbound/{}/receipts", srv.base_url, order_id)),
        &tenant_a,
    )
    .json(&json!({
        "receipts": [{ "line_id": line_id, "quantity": 4, "to_location_id": dock_id }],
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Tenant B cannot read the order.
    let res = with_identity(
        client.get(format!("{}/inbound/{}", srv.base_url, order_id)),
        &tenant_b,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Tenant B sees no stock and no movements.
    let res = with_identity(client.get(format!("{}/stock", srv.base_url)), &tenant_b)
        .send()
        .await
        .unwrap();
    let stock: serde_json::Value = res.json().await.unwrap();
    assert!(stock["items"].as_array().unwrap().is_empty());

    let res = with_identity(
        client.get(format!("{}/stock/movements", srv.base_url)),
        &tenant_b,
    )
    .send()
    .await
    .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn replenishment_scan_feeds_the_task_queue() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();
    let client = reqwest::Client::new();

    let (_warehouse_id, _dock_id, pick_face_id, item_id) =
        seed_topology(&client, &srv.base_url, &identity).await;

    // Pick face wants at least 10; it holds 2.
    let res = with_identity(
        client.post(format!(
            "{}/catalog/locations/{}/policy",
            srv.base_url, pick_face_id
        )),
        &identity,
    )
    .json(&json!({ "min_quantity": 10, "max_quantity": 50 }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = with_identity(client.post(format!("{}/stock/adjust", srv.base_url)), &identity)
        .json(&json!({ "item_id": item_id, "location_id": pick_face_id, "delta": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = with_identity(
        client.post(format!("{}/scans/replenishment", srv.base_url)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let scan: serde_json::Value = res.json().await.unwrap();
    assert_eq!(scan["created"], 1);
    assert_eq!(scan["tasks"][0]["type"], "replenishment");
    assert_eq!(
        scan["tasks"][0]["location_id"].as_str().unwrap(),
        pick_face_id
    );
    let task_id = scan["tasks"][0]["id"].as_str().unwrap().to_string();

    // A second scan does not duplicate the open task.
    let res = with_identity(
        client.post(format!("{}/scans/replenishment", srv.base_url)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    let scan: serde_json::Value = res.json().await.unwrap();
    assert_eq!(scan["created"], 0);

    // Work the task through its lifecycle.
    let res = with_identity(
        client.post(format!("{}/tasks/{}/assign", srv.base_url, task_id)),
        &identity,
    )
    .json(&json!({ "assignee": identity.actor.to_string() }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = with_identity(
        client.post(format!("{}/tasks/{}/start", srv.base_url, task_id)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = with_identity(
        client.post(format!("{}/tasks/{}/complete", srv.base_url, task_id)),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let done: serde_json::Value = res.json().await.unwrap();
    assert_eq!(done["status"], "done");

    let res = with_identity(client.get(format!("{}/tasks/stats", srv.base_url)), &identity)
        .send()
        .await
        .unwrap();
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["done"], 1);
    assert_eq!(stats["pending"], 0);
}

#[tokio::test]
async fn putaway_suggestion_follows_rules() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();
    let client = reqwest::Client::new();

    let (_warehouse_id, _dock_id, pick_face_id, _item_id) =
        seed_topology(&client, &srv.base_url, &identity).await;

    let rule = post_created(
        &client,
        &identity,
        format!("{}/putaway/rules", srv.base_url),
        json!({
            "name": "cold chain",
            "priority": 10,
            "criteria": { "category": "cold" },
            "target_location_id": pick_face_id,
        }),
    )
    .await;
    let rule_id = rule["id"].as_str().unwrap().to_string();

    // Matching attributes route to the rule's target.
    let res = with_identity(client.post(format!("{}/putaway/suggest", srv.base_url)), &identity)
        .json(&json!({ "attributes": { "category": "cold", "size": "small" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let suggestion: serde_json::Value = res.json().await.unwrap();
    assert_eq!(suggestion["source"], "rule");
    assert_eq!(suggestion["location_id"].as_str().unwrap(), pick_face_id);

    // No match falls back to the receiving zone.
    let res = with_identity(client.post(format!("{}/putaway/suggest", srv.base_url)), &identity)
        .json(&json!({ "attributes": { "category": "dry" } }))
        .send()
        .await
        .unwrap();
    let suggestion: serde_json::Value = res.json().await.unwrap();
    assert_eq!(suggestion["source"], "receiving_zone");

    // Deactivated rules stop matching.
    let res = with_identity(
        client.post(format!(
            "{}/putaway/rules/{}/deactivate",
            srv.base_url, rule_id
        )),
        &identity,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = with_identity(client.post(format!("{}/putaway/suggest", srv.base_url)), &identity)
        .json(&json!({ "attributes": { "category": "cold" } }))
        .send()
        .await
        .unwrap();
    let suggestion: serde_json::Value = res.json().await.unwrap();
    assert_eq!(suggestion["source"], "receiving_zone");
}

#[tokio::test]
async fn invalid_id_is_rejected_with_bad_request() {
    let srv = TestServer::spawn().await;
    let identity = Identity::new();

    let client = reqwest::Client::new();
    let res = with_identity(
        client.get(format!("{}/catalog/items/not-a-uuid", srv.base_url)),
        &identity,
    )
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}
