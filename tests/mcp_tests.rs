//! MCP servers and the client over in-process pipes.

mod common;

use common::mocks::{tool_call, ScriptedLLM};
use common::{day, seeded_service};
use rmcp::{ServerHandler, ServiceExt};
use serde_json::json;
use std::collections::HashMap;
use tooldeck::agents::ToolAgent;
use tooldeck::llm::{LLMResponse, Role};
use tooldeck::mcp::booking::{BOOKINGS_URI, TURFS_URI};
use tooldeck::mcp::client::prompt_text;
use tooldeck::mcp::{BookingServer, CalculatorServer, DemoServer, McpClient, MultiServerClient, PromptServer};
use tooldeck::types::AppError;

async fn connect<S>(name: &str, server: S) -> McpClient
where
    S: ServerHandler,
{
    let (server_io, client_io) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_io).await {
            let _ = running.waiting().await;
        }
    });
    McpClient::connect(name, client_io).await.unwrap()
}

async fn booking_client() -> McpClient {
    connect("booking", BookingServer::new(seeded_service().await)).await
}

fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_calculator_tools() {
    let client = connect("calculator", CalculatorServer::new()).await;

    let mut names: Vec<String> = client
        .list_tools()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["add", "multiply"]);

    assert_eq!(client.call_tool_text("add", json!({"a": 2, "b": 3})).await.unwrap(), "5");
    assert_eq!(
        client.call_tool_text("multiply", json!({"a": -4, "b": 6})).await.unwrap(),
        "-24"
    );

    let overflow = client
        .call_tool_text("add", json!({"a": i64::MAX, "b": 1}))
        .await
        .unwrap_err();
    assert_eq!(overflow, AppError::Upstream("❌ Integer overflow in add".into()));

    let bad = client.call_tool("add", json!({"a": "two", "b": 3})).await.unwrap_err();
    assert!(matches!(bad, AppError::Validation(_)), "{:?}", bad);

    let not_object = client.call_tool("add", json!([2, 3])).await.unwrap_err();
    assert!(matches!(not_object, AppError::Validation(_)));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_booking_resources() {
    let client = booking_client().await;

    let info = client.server_info().unwrap();
    assert_eq!(info.server_info.name, "turf-booking-server");

    let uris: Vec<String> = client
        .list_resources()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.uri.clone())
        .collect();
    assert_eq!(uris, vec![TURFS_URI.to_string(), BOOKINGS_URI.to_string()]);

    let turfs = client.read_resource(TURFS_URI).await.unwrap();
    assert!(turfs.starts_with("🏟️ Available Turfs:"));

    let availability = client
        .read_resource(&format!("catalog://availability/1/{}", day(0)))
        .await
        .unwrap();
    assert!(availability.contains("• 18:00 - 20:00"));

    let unknown = client.read_resource("catalog://nothing").await.unwrap_err();
    assert_eq!(unknown, AppError::NotFound("Unknown resource: catalog://nothing".into()));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_booking_tool_reports_conflict_as_error_result() {
    let client = booking_client().await;
    let request = json!({
        "turf_id": 5,
        "customer_name": "Ananya",
        "customer_phone": "9000000003",
        "booking_date": day(2),
        "start_time": "17:00",
        "end_time": "19:00"
    });

    let confirmed = client.call_tool_text("make_booking", request.clone()).await.unwrap();
    assert!(confirmed.starts_with("✅ Booking Confirmed!"));
    assert!(confirmed.contains("Total Cost: ₹1800"));

    let result = client.call_tool("make_booking", request).await.unwrap();
    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        tooldeck::mcp::client::result_text(&result),
        "❌ Time slot conflicts with existing booking. Check availability first."
    );

    let bookings = client.call_tool_text("get_all_bookings", json!({})).await.unwrap();
    assert!(bookings.contains("Sportz Zone"));
    assert!(!bookings.contains("Ananya"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_booking_prompts() {
    let client = booking_client().await;

    let prompts = client.list_prompts().await.unwrap();
    assert_eq!(prompts.len(), 5);

    let result = client
        .get_prompt(
            "check-availability",
            &args(&[("turf_id", "2"), ("date", "2030-01-09"), ("preferred_time", "18:00-20:00")]),
        )
        .await
        .unwrap();
    let text = prompt_text(&result).unwrap();
    assert!(text.starts_with(
        "Check the availability of turf 2 on 2030-01-09 for preferred time 18:00-20:00."
    ));

    let missing = client
        .get_prompt("check-availability", &args(&[("turf_id", "2")]))
        .await
        .unwrap_err();
    assert_eq!(
        missing,
        AppError::Validation(
            "Missing required argument 'date' for prompt 'check-availability'".into()
        )
    );

    let unknown = client.get_prompt("nope", &HashMap::new()).await.unwrap_err();
    assert_eq!(unknown, AppError::NotFound("Prompt not found: nope".into()));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_prompt_only_server() {
    let client = connect("prompts", PromptServer::new()).await;
    let info = client.server_info().unwrap();
    assert!(info.capabilities.tools.is_none());
    assert!(info.capabilities.prompts.is_some());

    let result = client
        .get_prompt("view-bookings", &args(&[("turf_filter", "3")]))
        .await
        .unwrap();
    assert!(prompt_text(&result).unwrap().starts_with("Show me all current bookings for turf 3."));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_demo_server() {
    let client = connect("demo", DemoServer::new()).await;

    let templates = client.list_resource_templates().await.unwrap();
    assert_eq!(templates[0].uri_template, "greeting://{name}");
    assert_eq!(client.read_resource("greeting://Alice").await.unwrap(), "Hello, Alice!");

    let review = client
        .get_prompt("code_review", &args(&[("language", "rust"), ("code", "fn main() {}")]))
        .await
        .unwrap();
    assert_eq!(
        prompt_text(&review).unwrap(),
        "Please review this rust code:\n\n```rust\nfn main() {}\n```"
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_agent_uses_tools_from_several_servers() {
    let calculator = connect("calculator", CalculatorServer::new()).await;
    let booking = booking_client().await;
    let servers = MultiServerClient::from_clients(vec![calculator, booking]);
    let registry = servers.registry().await.unwrap();
    assert_eq!(
        registry.tool_names(),
        vec![
            "add",
            "check_turf_availability",
            "get_all_bookings",
            "get_all_turfs",
            "make_booking",
            "multiply"
        ]
    );

    let llm = ScriptedLLM::new(vec![
        LLMResponse::with_tool_calls(vec![tool_call(
            "call_1",
            "check_turf_availability",
            json!({"turf_id": 1, "date": day(0)}),
        )]),
        LLMResponse::text("Green Valley is free from 08:00 to 18:00."),
    ]);
    let mut agent = ToolAgent::new(llm.clone(), registry);

    let response = agent.run("Is turf 1 free today?").await.unwrap();
    assert_eq!(response.content, "Green Valley is free from 08:00 to 18:00.");
    assert_eq!(response.tool_calls.len(), 1);
    assert!(response.tool_calls[0].success);
    assert!(response.tool_calls[0].result.contains("🔴 Booked Slots:"));

    let second_request = &llm.requests()[1];
    let tool_message = second_request.last().unwrap();
    assert_eq!(tool_message.role, Role::Tool);
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(llm.offered_tools().len(), 6);

    servers.close().await;
}
