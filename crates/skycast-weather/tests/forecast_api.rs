//! Integration tests for the forecast, sun, and geolocation clients
//! against a mock HTTP server.

use skycast_weather::types::Coordinates;
use skycast_weather::{ForecastClient, GeoIpClient, SunClient};
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn philly() -> Coordinates {
    Coordinates::new(40.0, -75.0)
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 40.0,
        "longitude": -75.0,
        "timezone": "America/New_York",
        "current": {
            "time": "2026-08-29T12:00",
            "temperature_2m": 24.1,
            "relative_humidity_2m": 55,
            "precipitation": 0.0,
            "wind_speed_10m": 3.4,
            "weather_code": 2,
            "cloud_cover": 40
        }
    })
}

#[tokio::test]
async fn fetch_current_returns_normalized_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param_contains("current", "temperature_2m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&mock_server)
        .await;

    let client = ForecastClient::with_base_url(&mock_server.uri()).unwrap();
    let forecast = client.fetch_current(philly()).await.unwrap();

    assert_eq!(forecast.current.temperature_2m, 24.1);
    assert_eq!(forecast.current.weather_code, 2);
    assert_eq!(
        forecast.current.condition(),
        skycast_weather::Condition::PartlyCloudy
    );
}

#[tokio::test]
async fn fetch_current_surfaces_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = ForecastClient::with_base_url(&mock_server.uri()).unwrap();
    let err = client.fetch_current(philly()).await.unwrap_err();
    assert!(err.to_string().contains("500"), "unexpected error: {err}");
}

#[tokio::test]
async fn fetch_hourly_parses_series() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param_contains("hourly", "precipitation_probability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 40.0,
            "longitude": -75.0,
            "hourly": {
                "time": ["2026-08-29T00:00", "2026-08-29T01:00"],
                "temperature_2m": [20.0, 19.5],
                "precipitation_probability": [5, 10],
                "precipitation": [0.0, 0.1],
                "wind_speed_10m": [2.0, 2.5]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = ForecastClient::with_base_url(&mock_server.uri()).unwrap();
    let forecast = client.fetch_hourly(philly()).await.unwrap();

    assert_eq!(forecast.hourly.time.len(), 2);
    assert_eq!(forecast.hourly.temperature_2m[1], 19.5);
    assert_eq!(forecast.hourly.precipitation_probability[1], 10.0);
}

#[tokio::test]
async fn fetch_daily_parses_series() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param_contains("daily", "temperature_2m_max"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 40.0,
            "longitude": -75.0,
            "daily": {
                "time": ["2026-08-29"],
                "temperature_2m_max": [28.0],
                "temperature_2m_min": [17.0],
                "precipitation_probability_max": [30],
                "precipitation_sum": [1.2],
                "wind_speed_10m_max": [6.0],
                "weather_code": [61]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = ForecastClient::with_base_url(&mock_server.uri()).unwrap();
    let forecast = client.fetch_daily(philly()).await.unwrap();

    assert_eq!(forecast.daily.time, vec!["2026-08-29"]);
    assert_eq!(forecast.daily.weather_code, vec![61]);
}

#[tokio::test]
async fn sun_client_parses_iso_timestamps() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {
                "sunrise": "2026-08-29T10:21:29+00:00",
                "sunset": "2026-08-29T23:38:57+00:00"
            },
            "status": "OK"
        })))
        .mount(&mock_server)
        .await;

    let client = SunClient::with_base_url(&mock_server.uri()).unwrap();
    let sun = client.fetch(philly()).await.unwrap();

    assert!(sun.is_known());
    assert_eq!(
        sun.sunrise.map(|t| t.to_rfc3339()),
        Some("2026-08-29T10:21:29+00:00".to_string())
    );
}

#[tokio::test]
async fn sun_client_treats_missing_results_as_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "INVALID" })),
        )
        .mount(&mock_server)
        .await;

    let client = SunClient::with_base_url(&mock_server.uri()).unwrap();
    let sun = client.fetch(philly()).await.unwrap();

    assert!(!sun.is_known());
}

#[tokio::test]
async fn geoip_lookup_returns_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 47.6,
            "lon": -122.3
        })))
        .mount(&mock_server)
        .await;

    let client = GeoIpClient::with_base_url(&mock_server.uri()).unwrap();
    let coords = client.lookup().await.unwrap();

    assert_eq!(coords.latitude, 47.6);
    assert_eq!(coords.longitude, -122.3);
}

#[tokio::test]
async fn geoip_lookup_rejects_failed_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "fail", "message": "private range" })),
        )
        .mount(&mock_server)
        .await;

    let client = GeoIpClient::with_base_url(&mock_server.uri()).unwrap();
    assert!(client.lookup().await.is_err());
}
