//! HTTP surface: JSON API and dashboard pages.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::{EchoConnector, FailingConnector};
use common::{day, seeded_service};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tooldeck::agents::{AgentConnector, AgentTimeouts, SyncAgent};
use tooldeck::api::app;
use tooldeck::{AppState, ConfigManager, ToolDeckConfig};

async fn server_with(connector: Arc<dyn AgentConnector>) -> TestServer {
    let agent = SyncAgent::new(
        connector,
        AgentTimeouts {
            start: Duration::from_secs(5),
            setup: Duration::from_secs(5),
            message: Duration::from_secs(5),
        },
    );
    let state = AppState {
        config_manager: Arc::new(ConfigManager::from_config(ToolDeckConfig::default())),
        bookings: seeded_service().await,
        agent: Arc::new(agent),
    };
    TestServer::new(app(state)).unwrap()
}

async fn server() -> TestServer {
    server_with(EchoConnector::new()).await
}

#[tokio::test]
async fn test_health() {
    let server = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_turfs_ordered_by_name() {
    let server = server().await;
    let turfs: Vec<Value> = server.get("/api/turfs").await.json();

    let names: Vec<&str> = turfs.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Champions Ground",
            "City Sports Arena",
            "Green Valley Turf",
            "Phoenix Turf",
            "Sportz Zone"
        ]
    );
}

#[tokio::test]
async fn test_availability_json() {
    let server = server().await;
    let response = server.get(&format!("/api/availability/1/{}", day(0))).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["turf_name"], "Green Valley Turf");
    assert_eq!(body["booked_slots"].as_array().unwrap().len(), 4);
    assert_eq!(body["available_slots"].as_array().unwrap().len(), 13);
    assert_eq!(body["bookings"][1], json!({"start_time": "18:00", "end_time": "20:00"}));
}

#[tokio::test]
async fn test_availability_errors_map_to_status() {
    let server = server().await;

    let bad_date = server.get("/api/availability/1/07-01-2030").await;
    bad_date.assert_status(StatusCode::BAD_REQUEST);

    let unknown = server.get(&format!("/api/availability/42/{}", day(1))).await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<Value>()["error"], "Turf with ID 42 not found");
}

#[tokio::test]
async fn test_create_booking_then_conflict() {
    let server = server().await;
    let body = json!({
        "turf_id": 3,
        "customer_name": "Ravi",
        "customer_phone": "9123456780",
        "booking_date": day(4),
        "start_time": "19:00",
        "end_time": "21:00"
    });

    let created = server.post("/api/bookings").json(&body).await;
    created.assert_status(StatusCode::CREATED);
    let confirmed: Value = created.json();
    assert_eq!(confirmed["turf_name"], "Phoenix Turf");
    assert_eq!(confirmed["booking"]["total_cost"], 2000.0);

    let again = server.post("/api/bookings").json(&body).await;
    again.assert_status(StatusCode::CONFLICT);

    let bookings: Vec<Value> = server.get("/api/bookings").await.json();
    assert_eq!(bookings.len(), 6);
    assert!(bookings.iter().all(|b| b.get("customer_phone").is_none()));
}

#[tokio::test]
async fn test_chat_goes_through_agent() {
    let server = server().await;

    let response = server
        .post("/api/chat")
        .json(&json!({"message": "  Which turfs are free?  "}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["response"], "echo: Which turfs are free?");

    let status: Value = server.get("/api/agent/status").await.json();
    assert_eq!(status["initialized"], true);
}

#[tokio::test]
async fn test_empty_chat_rejected() {
    let server = server().await;
    let response = server.post("/api/chat").json(&json!({"message": "   "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Message cannot be empty");
}

#[tokio::test]
async fn test_agent_failure_is_reply_text() {
    let server = server_with(FailingConnector::new()).await;
    let response = server.post("/api/chat").json(&json!({"message": "hi"})).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["response"],
        "❌ Agent not initialized. Setup failed."
    );
}

#[tokio::test]
async fn test_prompts() {
    let server = server().await;

    let catalog: Vec<Value> = server.get("/api/prompts").await.json();
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog[0]["name"], "check-availability");

    let reply = server
        .post("/api/prompts/list-turfs")
        .json(&json!({}))
        .await;
    reply.assert_status_ok();
    assert!(reply.json::<Value>()["response"]
        .as_str()
        .unwrap()
        .starts_with("echo: "));

    let missing = server.post("/api/prompts/nope").json(&json!({})).await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_index_lists_forms_and_data() {
    let server = server().await;
    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("action=\"/dashboard/availability\""));
    assert!(html.contains("action=\"/dashboard/book\""));
    assert!(html.contains("action=\"/dashboard/chat\""));
    assert!(html.contains("Green Valley Turf"));
    assert!(html.contains("Agent initialized: false"));
}

#[tokio::test]
async fn test_dashboard_booking_form() {
    let server = server().await;
    let form = [
        ("turf_id", "2".to_string()),
        ("customer_name", " Sam <b> ".to_string()),
        ("customer_phone", "9000000002".to_string()),
        ("booking_date", day(2)),
        ("start_time", "07:00".to_string()),
        ("end_time", "08:00".to_string()),
    ];

    let response = server.post("/dashboard/book").form(&form).await;
    response.assert_status(StatusCode::CREATED);
    let html = response.text();
    assert!(html.contains("Booking Confirmed!"));
    assert!(html.contains("Sam &lt;b&gt;"));

    let conflict = server.post("/dashboard/book").form(&form).await;
    conflict.assert_status(StatusCode::CONFLICT);
    assert!(conflict.text().contains("class=\"error\""));
}

#[tokio::test]
async fn test_dashboard_availability_form() {
    let server = server().await;
    let form = [("turf_id", "5".to_string()), ("date", day(1))];
    let response = server.post("/dashboard/availability").form(&form).await;
    response.assert_status_ok();
    assert!(response.text().contains("Fully Available (06:00 - 23:00)"));
}
