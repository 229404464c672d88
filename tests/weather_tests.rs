//! Weather client against a mocked WeatherAPI.

use rstest::rstest;
use serde_json::json;
use tooldeck::tools::weather::{GetWeather, WeatherClient};
use tooldeck::tools::Tool;
use tooldeck::types::AppError;
use tooldeck::utils::toml_config::WeatherConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> WeatherClient {
    let config = WeatherConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    WeatherClient::new(&config, Some("test-key".into())).unwrap()
}

fn chennai() -> serde_json::Value {
    json!({
        "location": {
            "name": "Chennai",
            "region": "Tamil Nadu",
            "country": "India",
            "localtime": "2030-01-07 18:05"
        },
        "current": {
            "temp_c": 29.5,
            "temp_f": 85.1,
            "condition": {"text": "Partly cloudy"},
            "wind_kph": 11.2,
            "wind_dir": "NE",
            "humidity": 70,
            "vis_km": 8.0
        }
    })
}

#[tokio::test]
async fn test_report_is_rendered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "Chennai"))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chennai()))
        .expect(1)
        .mount(&server)
        .await;

    let tool = GetWeather::new(client(&server));
    let text = tool.execute(json!({"location": "Chennai"})).await.unwrap();
    let text = text.as_str().unwrap();

    assert!(text.starts_with("🌤️ Weather Report for Chennai, Tamil Nadu, India\n"));
    assert!(text.contains("🌡️ Temperature: 29.5°C (85.1°F)"));
    assert!(text.contains("☁️ Condition: Partly cloudy"));
    assert!(text.ends_with("🕐 Local Time: 2030-01-07 18:05"));
}

#[rstest]
#[case(400, "Invalid location")]
#[case(401, "Invalid Weather API key")]
#[case(403, "Weather API access denied")]
#[case(500, "Weather API error: 500")]
#[tokio::test]
async fn test_error_statuses(#[case] status: u16, #[case] prefix: &str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client(&server).current("Atlantis").await.unwrap_err();
    assert!(
        err.detail().starts_with(prefix),
        "status {}: {:?}",
        status,
        err
    );
    if status == 400 {
        assert!(matches!(err, AppError::Validation(_)));
    } else {
        assert!(matches!(err, AppError::Upstream(_)));
    }
}

#[tokio::test]
async fn test_tool_requires_location() {
    let server = MockServer::start().await;
    let tool = GetWeather::new(client(&server));
    let err = tool.execute(json!({})).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
