mod common;

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use common::{test_app, TEST_USER_AGENT};

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("q").map(String::as_str) == Some("boom") {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }
    if params.get("q").map(String::as_str) == Some("garbled") {
        return "not json".into_response();
    }
    Json(json!([{
        "display_name": params.get("q"),
        "format": params.get("format"),
        "limit": params.get("limit"),
        "user_agent": user_agent(&headers),
        "lat": "36.8065",
        "lon": "10.1815"
    }]))
    .into_response()
}

async fn reverse(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("lat").map(String::as_str) == Some("0") {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }
    Json(json!({
        "lat": params.get("lat"),
        "lon": params.get("lon"),
        "addressdetails": params.get("addressdetails"),
        "user_agent": user_agent(&headers),
        "address": { "city": "Tunis", "country": "Tunisie" }
    }))
    .into_response()
}

/// Local stand-in for the Nominatim API. Returns its base URL.
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/reverse", get(reverse));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// An address nothing is listening on.
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn search_forwards_query_and_user_agent() {
    let app = test_app(&spawn_upstream().await);

    let (status, body) = app
        .send("GET", "/api/geocode?q=Rue%20de%20Marseille%2C%20Tunis", None, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body[0]["display_name"], "Rue de Marseille, Tunis");
    assert_eq!(body[0]["format"], "json");
    assert_eq!(body[0]["limit"], "1");
    assert_eq!(body[0]["user_agent"], TEST_USER_AGENT);

    let (_, body) = app.send("GET", "/api/geocode?q=Sfax&limit=5", None, None).await;
    assert_eq!(body[0]["limit"], "5");
}

#[tokio::test]
async fn reverse_forwards_coordinates() {
    let app = test_app(&spawn_upstream().await);

    let (status, body) = app
        .send("GET", "/api/reverse-geocode?lat=36.8065&lon=10.1815", None, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["lat"], "36.8065");
    assert_eq!(body["lon"], "10.1815");
    assert_eq!(body["addressdetails"], "1");
    assert_eq!(body["address"]["city"], "Tunis");
    assert_eq!(body["user_agent"], TEST_USER_AGENT);

    let (_, body) = app
        .send(
            "GET",
            "/api/reverse-geocode?lat=36.8&lon=10.1&addressdetails=0",
            None,
            None,
        )
        .await;
    assert_eq!(body["addressdetails"], "0");

    let (_, body) = app
        .send(
            "GET",
            "/api/reverse-geocode?lat=36.8&lon=10.1&addressdetails=1",
            None,
            None,
        )
        .await;
    assert_eq!(body["addressdetails"], "1");
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let app = test_app(&spawn_upstream().await);

    for uri in [
        "/api/geocode",
        "/api/geocode?q=",
        "/api/geocode?q=Tunis&limit=many",
        "/api/reverse-geocode?lat=36.8",
        "/api/reverse-geocode?lon=10.1",
        "/api/reverse-geocode?lat=north&lon=10.1",
        "/api/reverse-geocode?lat=36.8&lon=10.1&addressdetails=2",
        "/api/reverse-geocode?lat=36.8&lon=10.1&addressdetails=yes",
    ] {
        let (status, body) = app.send("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn upstream_error_status_becomes_500() {
    let app = test_app(&spawn_upstream().await);

    let (status, body) = app.send("GET", "/api/geocode?q=boom", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Nominatim API error" }));

    let (status, body) = app
        .send("GET", "/api/reverse-geocode?lat=0&lon=0", None, None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Nominatim API error" }));
}

#[tokio::test]
async fn undecodable_body_becomes_500() {
    let app = test_app(&spawn_upstream().await);

    let (status, body) = app.send("GET", "/api/geocode?q=garbled", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch geocode" }));
}

#[tokio::test]
async fn unreachable_upstream_becomes_500() {
    let app = test_app(&closed_port().await);

    let (status, body) = app.send("GET", "/api/geocode?q=Tunis", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch geocode" }));

    let (status, body) = app
        .send("GET", "/api/reverse-geocode?lat=36.8&lon=10.1", None, None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch reverse geocode" }));
}

#[tokio::test]
async fn proxy_needs_no_session_and_allows_cross_origin() {
    let app = test_app(&spawn_upstream().await);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/geocode?q=Tunis")
        .header("origin", "http://localhost:3000")
        .body(axum::body::Body::empty())
        .unwrap();
    let res = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
