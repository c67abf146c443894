//! Weather tool handlers exposed over MCP.
//!
//! Both tools build a query against the Open-Meteo forecast endpoint, hand it
//! to the [`WeatherApi`] seam, and map the outcome to plain text: the payload
//! rendered as compact JSON on success, a fixed per-tool sentence when the
//! upstream yields nothing. Coordinates pass through verbatim; only the
//! forecast day count is normalized (saturated into 1..=16).

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{
    CallToolResult, Content, Implementation, JsonObject, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::clients::openmeteo::{OpenMeteoClient, WeatherApi, OPENMETEO_API_BASE};

const CURRENT_FIELDS: &str = "temperature_2m,is_day,showers,cloud_cover,wind_speed_10m,\
wind_direction_10m,pressure_msl,snowfall,precipitation,relative_humidity_2m,\
apparent_temperature,rain,weather_code,surface_pressure,wind_gusts_10m";

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,\
precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max,weather_code";

const CURRENT_UNAVAILABLE: &str = "Unable to fetch current weather data for this location.";
const FORECAST_UNAVAILABLE: &str = "Unable to fetch forecast data for this location.";

const MIN_FORECAST_DAYS: i64 = 1;
const MAX_FORECAST_DAYS: i64 = 16;
const DEFAULT_FORECAST_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct CurrentWeatherArgs {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    DEFAULT_FORECAST_DAYS
}

fn parse_args<T: serde::de::DeserializeOwned>(args: JsonObject) -> Result<T, McpError> {
    serde_json::from_value(JsonValue::Object(args))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

/// Deterministic, lossless text form of an upstream payload.
fn render_payload(payload: &JsonValue) -> String {
    payload.to_string()
}

/// A decoded body that carries no data (null, `{}`, `[]`, `""`, `0`, `false`)
/// counts as absent, the same as a failed fetch.
fn payload_is_empty(payload: &JsonValue) -> bool {
    match payload {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(a) => a.is_empty(),
        JsonValue::Object(o) => o.is_empty(),
    }
}

#[derive(Clone)]
pub struct WeatherSvc {
    api: Arc<dyn WeatherApi>,
}

impl WeatherSvc {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> String {
        let query = format!(
            "/forecast?latitude={latitude}&longitude={longitude}&current={CURRENT_FIELDS}"
        );
        match self.api.fetch(&query).await {
            Some(payload) if !payload_is_empty(&payload) => render_payload(&payload),
            _ => CURRENT_UNAVAILABLE.to_string(),
        }
    }

    pub async fn forecast(&self, latitude: f64, longitude: f64, days: i64) -> String {
        let days = days.clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS);
        let query = format!(
            "/forecast?latitude={latitude}&longitude={longitude}&daily={DAILY_FIELDS}\
&forecast_days={days}&timezone=auto"
        );
        match self.api.fetch(&query).await {
            Some(payload) if !payload_is_empty(&payload) => render_payload(&payload),
            _ => FORECAST_UNAVAILABLE.to_string(),
        }
    }
}

impl ServerHandler for WeatherSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Weather data tools backed by the Open-Meteo API. \
                Provides current conditions and daily forecasts for any coordinates."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

#[rmcp::tool_router]
impl WeatherSvc {
    #[rmcp::tool(
        name = "get_current_weather",
        description = "Get current weather for a location. Args: latitude, longitude."
    )]
    async fn get_current_weather(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args: CurrentWeatherArgs = parse_args(params.0)?;
        tracing::debug!(
            latitude = args.latitude,
            longitude = args.longitude,
            "get_current_weather invoked"
        );
        let text = self.current_weather(args.latitude, args.longitude).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[rmcp::tool(
        name = "get_forecast",
        description = "Get weather forecast for a location. Args: latitude, longitude, days (1-16, default 7)."
    )]
    async fn get_forecast(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args: ForecastArgs = parse_args(params.0)?;
        tracing::debug!(
            latitude = args.latitude,
            longitude = args.longitude,
            days = args.days,
            "get_forecast invoked"
        );
        let text = self
            .forecast(args.latitude, args.longitude, args.days)
            .await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

pub type WeatherRouter = ToolRouter<WeatherSvc>;

impl WeatherSvc {
    pub fn router() -> WeatherRouter {
        // Wrapper to expose the macro-generated tool_router
        Self::tool_router()
    }
}

/// Factory shape required by the streamable HTTP transport.
pub fn factory_with_api(api: Arc<dyn WeatherApi>) -> (WeatherSvc, WeatherRouter) {
    (WeatherSvc::new(api), WeatherSvc::router())
}

pub fn factory_from_env() -> (WeatherSvc, WeatherRouter) {
    let base = std::env::var("OPENMETEO_BASE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| OPENMETEO_API_BASE.into());
    factory_with_api(Arc::new(OpenMeteoClient::new(base)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Stub API that records every query and replays a fixed payload.
    struct StubApi {
        payload: Option<JsonValue>,
        queries: Mutex<Vec<String>>,
    }

    impl StubApi {
        fn new(payload: Option<JsonValue>) -> Arc<Self> {
            Arc::new(Self {
                payload,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl WeatherApi for StubApi {
        async fn fetch(&self, query: &str) -> Option<JsonValue> {
            self.queries.lock().unwrap().push(query.to_string());
            self.payload.clone()
        }
    }

    #[tokio::test]
    async fn current_weather_renders_payload_losslessly() {
        let payload = json!({
            "latitude": 52.52,
            "current": {"temperature_2m": 18.3, "is_day": 1, "weather_code": 3}
        });
        let api = StubApi::new(Some(payload.clone()));
        let svc = WeatherSvc::new(api);

        let out = svc.current_weather(52.52, 13.405).await;
        assert_eq!(out, payload.to_string());
        assert!(out.contains("18.3"));
        assert!(out.contains("temperature_2m"));
        assert!(out.contains("weather_code"));
    }

    #[tokio::test]
    async fn current_weather_query_carries_fixed_field_set() {
        let api = StubApi::new(Some(json!({})));
        let svc = WeatherSvc::new(api.clone());

        svc.current_weather(52.52, 13.405).await;
        let queries = api.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0],
            format!("/forecast?latitude=52.52&longitude=13.405&current={CURRENT_FIELDS}")
        );
    }

    #[tokio::test]
    async fn current_weather_absent_returns_fixed_text() {
        let svc = WeatherSvc::new(StubApi::new(None));
        let out = svc.current_weather(52.52, 13.405).await;
        assert_eq!(out, "Unable to fetch current weather data for this location.");
    }

    #[tokio::test]
    async fn forecast_absent_returns_fixed_text() {
        let svc = WeatherSvc::new(StubApi::new(None));
        let out = svc.forecast(52.52, 13.405, 7).await;
        assert_eq!(out, "Unable to fetch forecast data for this location.");
    }

    #[tokio::test]
    async fn empty_object_payload_is_treated_as_absent() {
        let svc = WeatherSvc::new(StubApi::new(Some(json!({}))));
        let current = svc.current_weather(52.52, 13.405).await;
        assert_eq!(
            current,
            "Unable to fetch current weather data for this location."
        );
        let forecast = svc.forecast(52.52, 13.405, 7).await;
        assert_eq!(forecast, "Unable to fetch forecast data for this location.");
    }

    #[tokio::test]
    async fn null_payload_is_treated_as_absent() {
        let svc = WeatherSvc::new(StubApi::new(Some(JsonValue::Null)));
        let out = svc.current_weather(52.52, 13.405).await;
        assert_eq!(out, "Unable to fetch current weather data for this location.");
    }

    #[test]
    fn payload_emptiness_follows_truthiness() {
        assert!(payload_is_empty(&JsonValue::Null));
        assert!(payload_is_empty(&json!({})));
        assert!(payload_is_empty(&json!([])));
        assert!(payload_is_empty(&json!("")));
        assert!(payload_is_empty(&json!(0)));
        assert!(payload_is_empty(&json!(false)));
        assert!(!payload_is_empty(&json!({"current": {}})));
        assert!(!payload_is_empty(&json!([1])));
        assert!(!payload_is_empty(&json!(18.3)));
    }

    #[tokio::test]
    async fn forecast_query_carries_fields_days_and_timezone() {
        let api = StubApi::new(Some(json!({})));
        let svc = WeatherSvc::new(api.clone());

        svc.forecast(0.0, 0.0, 7).await;
        let queries = api.queries();
        assert_eq!(
            queries[0],
            format!(
                "/forecast?latitude=0&longitude=0&daily={DAILY_FIELDS}&forecast_days=7&timezone=auto"
            )
        );
    }

    #[tokio::test]
    async fn forecast_days_saturate_into_range() {
        let api = StubApi::new(Some(json!({})));
        let svc = WeatherSvc::new(api.clone());

        svc.forecast(0.0, 0.0, 99).await;
        svc.forecast(0.0, 0.0, 0).await;
        svc.forecast(0.0, 0.0, -5).await;
        svc.forecast(0.0, 0.0, 16).await;
        svc.forecast(0.0, 0.0, 1).await;

        let queries = api.queries();
        assert!(queries[0].contains("forecast_days=16"));
        assert!(queries[1].contains("forecast_days=1"));
        assert!(queries[2].contains("forecast_days=1"));
        assert!(queries[3].contains("forecast_days=16"));
        assert!(queries[4].contains("forecast_days=1"));
    }

    #[tokio::test]
    async fn forecast_tool_defaults_to_seven_days() {
        let api = StubApi::new(Some(json!({})));
        let svc = WeatherSvc::new(api.clone());

        let mut obj = JsonObject::new();
        obj.insert("latitude".into(), json!(52.52));
        obj.insert("longitude".into(), json!(13.405));
        svc.get_forecast(Parameters(obj)).await.unwrap();

        assert!(api.queries()[0].contains("forecast_days=7"));
    }

    #[tokio::test]
    async fn missing_latitude_is_invalid_params() {
        let svc = WeatherSvc::new(StubApi::new(Some(json!({}))));
        let mut obj = JsonObject::new();
        obj.insert("longitude".into(), json!(13.405));

        let err = svc
            .get_current_weather(Parameters(obj))
            .await
            .expect_err("expected invalid params");
        // JSON-RPC invalid params is -32602
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("latitude"));
    }

    #[tokio::test]
    async fn non_numeric_days_is_invalid_params() {
        let svc = WeatherSvc::new(StubApi::new(Some(json!({}))));
        let mut obj = JsonObject::new();
        obj.insert("latitude".into(), json!(0.0));
        obj.insert("longitude".into(), json!(0.0));
        obj.insert("days".into(), json!("soon"));

        let err = svc
            .get_forecast(Parameters(obj))
            .await
            .expect_err("expected invalid params");
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn tool_method_wraps_handler_text() {
        let svc = WeatherSvc::new(StubApi::new(None));
        let mut obj = JsonObject::new();
        obj.insert("latitude".into(), json!(52.52));
        obj.insert("longitude".into(), json!(13.405));

        let res = svc.get_current_weather(Parameters(obj)).await;
        assert!(res.is_ok());
    }

    #[test]
    fn tool_router_contains_both_weather_tools() {
        let names: Vec<String> = WeatherSvc::router()
            .into_iter()
            .map(|r| r.name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "get_current_weather"), "{names:?}");
        assert!(names.iter().any(|n| n == "get_forecast"), "{names:?}");
    }

    #[tokio::test]
    async fn slow_upstream_yields_unavailable_text() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/forecast");
            then.status(200)
                .delay(std::time::Duration::from_millis(500))
                .json_body(json!({}));
        });

        let client = OpenMeteoClient::with_timeout(
            server.base_url(),
            std::time::Duration::from_millis(50),
        );
        let svc = WeatherSvc::new(Arc::new(client));
        let out = svc.forecast(52.52, 13.405, 7).await;
        assert_eq!(out, "Unable to fetch forecast data for this location.");
    }
}
