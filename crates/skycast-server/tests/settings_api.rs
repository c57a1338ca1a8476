//! Local API tests driven through warp's test harness: settings CRUD,
//! the geolocation proxy, and the status snapshot.

use std::sync::Arc;

use skycast_core::settings::{Settings, SettingsStore};
use skycast_server::routes::routes;
use skycast_state::{AppState, PrefStore};
use skycast_weather::{ForecastClient, GeoIpClient, RadarClient, SunClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: tempfile::TempDir,
    geoip: MockServer,
    state: Arc<AppState>,
}

impl Harness {
    fn api(
        &self,
    ) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        routes(self.state.clone(), Arc::new(vec!["chromium".to_string()]))
    }
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let upstream = MockServer::start().await;
    let geoip = MockServer::start().await;
    let state = Arc::new(AppState::with_clients(
        SettingsStore::new(dir.path()),
        PrefStore::new(dir.path()),
        ForecastClient::with_base_url(&upstream.uri()).unwrap(),
        SunClient::with_base_url(&upstream.uri()).unwrap(),
        RadarClient::with_base_url(&upstream.uri()).unwrap(),
        GeoIpClient::with_base_url(&geoip.uri()).unwrap(),
        "http://geocode.invalid",
    ));
    Harness {
        _dir: dir,
        geoip,
        state,
    }
}

#[tokio::test]
async fn get_settings_creates_default_document() {
    let h = harness().await;

    let response = warp::test::request()
        .method("GET")
        .path("/settings")
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let settings: Settings = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn put_replaces_the_whole_document() {
    let h = harness().await;

    let body = serde_json::json!({
        "weatherApiKey": "wk-123",
        "mapApiKey": "mk-456",
        "reverseGeoApiKey": null,
        "startingLat": "40.0",
        "startingLon": "-75.0"
    });

    let response = warp::test::request()
        .method("PUT")
        .path("/settings")
        .json(&body)
        .reply(&h.api())
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .method("GET")
        .path("/settings")
        .reply(&h.api())
        .await;
    let settings: Settings = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(settings.weather_api_key.as_deref(), Some("wk-123"));
    assert_eq!(settings.starting_position(), Some((40.0, -75.0)));
}

#[tokio::test]
async fn patch_upserts_a_single_field() {
    let h = harness().await;

    let response = warp::test::request()
        .method("PATCH")
        .path("/setting")
        .json(&serde_json::json!({ "name": "weatherApiKey", "value": "wk-789" }))
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let settings: Settings = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(settings.weather_api_key.as_deref(), Some("wk-789"));
}

#[tokio::test]
async fn patch_accepts_numeric_values() {
    let h = harness().await;

    let response = warp::test::request()
        .method("PATCH")
        .path("/setting")
        .json(&serde_json::json!({ "name": "startingLat", "value": 40.0 }))
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let settings: Settings = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(settings.starting_lat.as_deref(), Some("40.0"));
}

#[tokio::test]
async fn patch_rejects_unknown_fields() {
    let h = harness().await;

    let response = warp::test::request()
        .method("PATCH")
        .path("/setting")
        .json(&serde_json::json!({ "name": "nonsense", "value": "x" }))
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_removes_a_field() {
    let h = harness().await;

    warp::test::request()
        .method("PATCH")
        .path("/setting")
        .json(&serde_json::json!({ "name": "mapApiKey", "value": "mk-1" }))
        .reply(&h.api())
        .await;

    let response = warp::test::request()
        .method("DELETE")
        .path("/setting")
        .json(&serde_json::json!({ "name": "mapApiKey" }))
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let settings: Settings = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(settings.map_api_key, None);
}

#[tokio::test]
async fn geolocation_proxies_the_upstream_lookup() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 47.6,
            "lon": -122.3
        })))
        .mount(&h.geoip)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path("/geolocation")
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["latitude"], 47.6);
    assert_eq!(body["longitude"], -122.3);
}

#[tokio::test]
async fn geolocation_failure_maps_to_bad_gateway() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.geoip)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path("/geolocation")
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn system_info_always_answers() {
    let h = harness().await;

    let response = warp::test::request()
        .method("GET")
        .path("/system-info")
        .reply(&h.api())
        .await;

    // Fields are best-effort: null is acceptable, absence is not.
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body.get("cpuTemp").is_some());
    assert!(body.get("fanSpeed").is_some());
    assert!(body.get("diskSpace").is_some());
}

#[tokio::test]
async fn activity_resets_the_screensaver_clock() {
    let h = harness().await;

    let response = warp::test::request()
        .method("POST")
        .path("/activity")
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn status_reports_the_render_mode() {
    let h = harness().await;
    h.state.load_preferences();

    let response = warp::test::request()
        .method("GET")
        .path("/status")
        .reply(&h.api())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["renderMode"], "normal");
    assert_eq!(body["preferences"]["tempUnit"], "f");
    assert_eq!(body["screensaverActive"], false);
}
