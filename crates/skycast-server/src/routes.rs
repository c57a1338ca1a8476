//! Warp route tree for the local kiosk API: settings CRUD, the
//! geolocation proxy, OS probes, window control, and the live status
//! snapshot.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use skycast_core::settings::Settings;
use skycast_state::{AppState, Coordinates};

use crate::{sysinfo, window};

/// Body of `PATCH /setting`.
#[derive(Debug, Deserialize)]
struct FieldUpsert {
    name: String,
    value: serde_json::Value,
}

/// Body of `DELETE /setting`.
#[derive(Debug, Deserialize)]
struct FieldRemove {
    name: String,
}

/// Body of `PATCH /preference`: storage key plus the string form the
/// preference is persisted as.
#[derive(Debug, Deserialize)]
struct PreferenceUpdate {
    name: String,
    value: String,
}

/// Build the complete route tree.
pub fn routes(
    state: Arc<AppState>,
    window_classes: Arc<Vec<String>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());
    let with_classes = warp::any().map(move || window_classes.clone());

    let get_settings = warp::get()
        .and(warp::path("settings"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_get_settings);

    let create_settings = warp::post()
        .and(warp::path("settings"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_get_settings);

    let replace_settings = warp::put()
        .and(warp::path("settings"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_replace_settings);

    let upsert_field = warp::patch()
        .and(warp::path("setting"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_upsert_field);

    let remove_field = warp::delete()
        .and(warp::path("setting"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_remove_field);

    let geolocation = warp::get()
        .and(warp::path("geolocation"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_geolocation);

    let system_info = warp::get()
        .and(warp::path("system-info"))
        .and(warp::path::end())
        .and_then(handle_system_info);

    let minimize = warp::post()
        .and(warp::path("window"))
        .and(warp::path("minimize"))
        .and(warp::path::end())
        .and(with_classes)
        .and_then(handle_minimize);

    let activity = warp::post()
        .and(warp::path("activity"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_activity);

    let status = warp::get()
        .and(warp::path("status"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_status);

    let weather = warp::get()
        .and(warp::path("weather"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_weather);

    let map_position = warp::post()
        .and(warp::path("map"))
        .and(warp::path("position"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_map_position);

    let map_reset = warp::post()
        .and(warp::path("map"))
        .and(warp::path("reset"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_map_reset);

    let map_marker = warp::post()
        .and(warp::path("map"))
        .and(warp::path("marker"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_marker_toggle);

    let map_animate = warp::post()
        .and(warp::path("map"))
        .and(warp::path("animate"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_animate_toggle);

    let panel_toggle = warp::post()
        .and(warp::path("panel"))
        .and(warp::path("toggle"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_panel_toggle);

    let dark_toggle = warp::post()
        .and(warp::path("dark-mode"))
        .and(warp::path("toggle"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_dark_toggle);

    let dark_source = warp::post()
        .and(warp::path("dark-mode"))
        .and(warp::path("source"))
        .and(warp::path::end())
        .and(with_state.clone())
        .and_then(handle_dark_source);

    let preference = warp::patch()
        .and(warp::path("preference"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_state)
        .and_then(handle_preference);

    get_settings
        .or(create_settings)
        .or(replace_settings)
        .or(upsert_field)
        .or(remove_field)
        .or(geolocation)
        .or(system_info)
        .or(minimize)
        .or(activity)
        .or(status)
        .or(weather)
        .or(map_position)
        .or(map_reset)
        .or(map_marker)
        .or(map_animate)
        .or(panel_toggle)
        .or(dark_toggle)
        .or(dark_source)
        .or(preference)
}

async fn handle_get_settings(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    match state.settings_store().load_or_create() {
        Ok(settings) => Ok(json_reply(&settings, StatusCode::OK)),
        Err(e) => {
            tracing::error!("Failed to read settings: {}", e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_replace_settings(
    body: Settings,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    match state.save_settings(&body) {
        Ok(()) => Ok(json_reply(&body, StatusCode::OK)),
        Err(e) => {
            tracing::error!("Failed to save settings: {}", e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_upsert_field(
    body: FieldUpsert,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    match state.settings_store().set_field(&body.name, &body.value) {
        Ok(settings) => Ok(json_reply(&settings, StatusCode::OK)),
        Err(e) => {
            tracing::warn!("Rejected setting update for {}: {}", body.name, e);
            Ok(error_reply(&e.to_string(), StatusCode::BAD_REQUEST))
        }
    }
}

async fn handle_remove_field(
    body: FieldRemove,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    match state.settings_store().remove_field(&body.name) {
        Ok(settings) => Ok(json_reply(&settings, StatusCode::OK)),
        Err(e) => {
            tracing::warn!("Rejected setting removal for {}: {}", body.name, e);
            Ok(error_reply(&e.to_string(), StatusCode::BAD_REQUEST))
        }
    }
}

async fn handle_geolocation(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    match state.geolocate().await {
        Ok(coords) => Ok(json_reply(&coords, StatusCode::OK)),
        Err(e) => {
            tracing::warn!("Geolocation proxy failed: {}", e);
            Ok(error_reply(&e.user_message(), StatusCode::BAD_GATEWAY))
        }
    }
}

async fn handle_system_info() -> Result<impl Reply, Infallible> {
    Ok(json_reply(&sysinfo::probe().await, StatusCode::OK))
}

async fn handle_minimize(window_classes: Arc<Vec<String>>) -> Result<impl Reply, Infallible> {
    match window::minimize(&window_classes).await {
        Ok(()) => Ok(json_reply(
            &serde_json::json!({ "ok": true }),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::warn!("Window minimize failed: {}", e);
            Ok(json_reply(
                &serde_json::json!({ "ok": false, "error": e.to_string() }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_activity(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.record_activity(Utc::now());
    Ok(json_reply(&serde_json::json!({ "ok": true }), StatusCode::OK))
}

async fn handle_status(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    Ok(json_reply(&state.status(Utc::now()), StatusCode::OK))
}

async fn handle_weather(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    Ok(json_reply(&state.weather(), StatusCode::OK))
}

async fn handle_map_position(
    coords: Coordinates,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    state.set_map_position(coords);
    Ok(json_reply(&serde_json::json!({ "ok": true }), StatusCode::OK))
}

async fn handle_map_reset(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.reset_map_position();
    Ok(json_reply(&serde_json::json!({ "ok": true }), StatusCode::OK))
}

async fn handle_marker_toggle(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.toggle_marker();
    Ok(json_reply(
        &serde_json::json!({ "markerVisible": state.marker_visible() }),
        StatusCode::OK,
    ))
}

async fn handle_animate_toggle(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.toggle_animate_map();
    Ok(json_reply(
        &serde_json::json!({ "animateMap": state.animate_map() }),
        StatusCode::OK,
    ))
}

async fn handle_panel_toggle(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.toggle_settings_panel();
    Ok(json_reply(
        &serde_json::json!({ "settingsPanelOpen": state.settings_panel_open() }),
        StatusCode::OK,
    ))
}

async fn handle_dark_toggle(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.toggle_dark_mode();
    Ok(json_reply(&dark_mode_body(&state), StatusCode::OK))
}

async fn handle_dark_source(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    state.toggle_dark_mode_source();
    Ok(json_reply(&dark_mode_body(&state), StatusCode::OK))
}

fn dark_mode_body(state: &AppState) -> serde_json::Value {
    serde_json::json!({
        "darkMode": state.dark_mode(),
        "autoDarkMode": state.auto_dark_mode(),
    })
}

async fn handle_preference(
    body: PreferenceUpdate,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    match state.apply_preference(&body.name, &body.value) {
        Ok(preferences) => Ok(json_reply(&preferences, StatusCode::OK)),
        Err(e) => {
            tracing::warn!("Rejected preference update for {}: {}", body.name, e);
            Ok(error_reply(&e.user_message(), StatusCode::BAD_REQUEST))
        }
    }
}

fn json_reply<T: serde::Serialize>(body: &T, status: StatusCode) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(message: &str, status: StatusCode) -> warp::reply::Response {
    json_reply(&serde_json::json!({ "error": message }), status)
}
