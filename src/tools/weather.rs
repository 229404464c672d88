//! Current-weather lookup against WeatherAPI.com

use crate::render;
use crate::tools::registry::{str_arg, Tool};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ToolDeckConfig, WeatherConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// The fields of a current-conditions response we report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: String,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub humidity: f64,
    pub vis_km: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    location: ApiLocation,
    current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    region: String,
    country: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: ApiCondition,
    wind_kph: f64,
    wind_dir: String,
    humidity: f64,
    vis_km: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
}

impl From<CurrentResponse> for WeatherReport {
    fn from(resp: CurrentResponse) -> Self {
        Self {
            name: resp.location.name,
            region: resp.location.region,
            country: resp.location.country,
            localtime: resp.location.localtime,
            temp_c: resp.current.temp_c,
            temp_f: resp.current.temp_f,
            condition: resp.current.condition.text,
            wind_kph: resp.current.wind_kph,
            wind_dir: resp.current.wind_dir,
            humidity: resp.current.humidity,
            vis_km: resp.current.vis_km,
        }
    }
}

pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    key_env: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            key_env: config.api_key_env.clone(),
        })
    }

    /// Client with the key taken from the configured environment variable.
    pub fn from_config(config: &ToolDeckConfig) -> Result<Self> {
        Self::new(&config.weather, config.weather_api_key().ok())
    }

    pub async fn current(&self, location: &str) -> Result<WeatherReport> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "Weather API key not found. Please set {} environment variable.",
                self.key_env
            ))
        })?;

        let url = format!("{}/current.json", self.base_url);
        debug!(%url, location, "weather request");

        let response = self
            .client
            .get(&url)
            .query(&[("key", key), ("q", location), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout("Weather API request timed out. Please try again.".to_string())
                } else if e.is_connect() {
                    AppError::Upstream(
                        "Unable to connect to weather service. Check your internet connection."
                            .to_string(),
                    )
                } else {
                    AppError::Upstream(format!("Error getting weather data: {}", e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            let body: CurrentResponse = response.json().await.map_err(|e| {
                AppError::Upstream(format!("Error getting weather data: {}", e))
            })?;
            return Ok(body.into());
        }

        let text = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "weather API returned an error");
        Err(match status {
            StatusCode::BAD_REQUEST => AppError::Validation(format!(
                "Invalid location: {}. Please check the spelling or try a different format.",
                location
            )),
            StatusCode::UNAUTHORIZED => AppError::Upstream(format!(
                "Invalid Weather API key. Please check your {}.",
                self.key_env
            )),
            StatusCode::FORBIDDEN => AppError::Upstream(
                "Weather API access denied. Check your API key permissions.".to_string(),
            ),
            other => AppError::Upstream(format!(
                "Weather API error: {} - {}",
                other.as_u16(),
                text
            )),
        })
    }
}

/// `get_weather` tool
pub struct GetWeather {
    client: WeatherClient,
}

impl GetWeather {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a location: temperature, condition, wind, humidity, visibility and local time"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name, zip code, or coordinates (e.g. \"London\", \"10001\", \"48.8566,2.3522\")"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let location = str_arg(&args, "location")?;
        let report = self.client.current(location).await?;
        Ok(Value::String(render::weather(&report)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_reported_before_request() {
        let config = WeatherConfig {
            // nothing listens here; a request would fail differently
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = WeatherClient::new(&config, Some("  ".into())).unwrap();

        let err = client.current("Chennai").await.unwrap_err();
        assert_eq!(
            err,
            AppError::Config(
                "Weather API key not found. Please set WEATHER_API_KEY environment variable."
                    .into()
            )
        );
    }

    #[test]
    fn test_report_from_api_shape() {
        let body = json!({
            "location": {"name": "Chennai", "region": "Tamil Nadu", "country": "India", "localtime": "2030-01-02 10:15"},
            "current": {
                "temp_c": 31.0, "temp_f": 87.8, "condition": {"text": "Sunny"},
                "wind_kph": 14.4, "wind_dir": "SE", "humidity": 62, "vis_km": 6.0
            }
        });
        let resp: CurrentResponse = serde_json::from_value(body).unwrap();
        let report = WeatherReport::from(resp);
        assert_eq!(report.condition, "Sunny");
        assert_eq!(report.humidity, 62.0);
    }
}
