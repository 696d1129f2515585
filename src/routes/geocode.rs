use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::geocode::{GeocodeError, DEFAULT_LIMIT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub addressdetails: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/geocode", get(search))
        .route("/api/reverse-geocode", get(reverse))
}

fn upstream_failure(err: GeocodeError, fallback: &str) -> AppError {
    tracing::error!(error = %err, "Geocoding request failed");
    match err {
        GeocodeError::Upstream { .. } => AppError::Upstream("Nominatim API error".to_string()),
        GeocodeError::Transport(_) | GeocodeError::Decode(_) => {
            AppError::Upstream(fallback.to_string())
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("Missing query parameter: {name}"))),
    }
}

fn coordinate(value: &Option<String>, name: &str) -> AppResult<f64> {
    required(value, name)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {name}")))
}

/// GET /api/geocode?q=&limit=
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let q = required(&query.q, "q")?;
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_LIMIT,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest("Invalid limit".to_string()))?,
    };

    let body = state
        .geocoder
        .search(q, limit)
        .await
        .map_err(|e| upstream_failure(e, "Failed to fetch geocode"))?;
    Ok(Json(body))
}

/// GET /api/reverse-geocode?lat=&lon=&addressdetails=
async fn reverse(
    State(state): State<AppState>,
    Query(query): Query<ReverseQuery>,
) -> AppResult<Json<Value>> {
    let lat = coordinate(&query.lat, "lat")?;
    let lon = coordinate(&query.lon, "lon")?;
    let details = match query.addressdetails.as_deref().map(str::trim) {
        None | Some("") | Some("1") => 1,
        Some("0") => 0,
        Some(_) => {
            return Err(AppError::BadRequest(
                "addressdetails must be 0 or 1".to_string(),
            ))
        }
    };

    let body = state
        .geocoder
        .reverse(lat, lon, details)
        .await
        .map_err(|e| upstream_failure(e, "Failed to fetch reverse geocode"))?;
    Ok(Json(body))
}
