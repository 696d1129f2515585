#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fournisseur::config::Config;
use fournisseur::db;
use fournisseur::routes;
use fournisseur::state::{AppState, DbPool};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_USER_AGENT: &str = "fournisseur-tests/1.0";

pub struct TestApp {
    pub router: Router,
    /// Direct handle for what the API never returns, such as reset tokens.
    pub db: DbPool,
    _dir: TempDir,
}

/// A router over a fresh database. bcrypt runs at its minimum cost.
pub fn test_app(geocoder_base_url: &str) -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = db::create_pool(&dir.path().join("test.db")).unwrap();
    db::run_migrations(&pool).unwrap();

    let mut config = Config::default();
    config.auth.password_cost = 4;
    config.geocoder.base_url = geocoder_base_url.to_string();
    config.geocoder.user_agent = TEST_USER_AGENT.to_string();

    let state = AppState::new(pool.clone(), config).unwrap();
    TestApp {
        router: routes::app(state),
        db: pool,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Sign up and return the session token.
    pub async fn sign_up(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/auth/signup",
                None,
                Some(json!({ "email": email, "password": "secret123", "fullName": "Test Owner" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Account id behind a session token.
    pub async fn account_id(&self, token: &str) -> String {
        let (_, session) = self.send("GET", "/auth/session", Some(token), None).await;
        session["account"]["id"].as_str().unwrap().to_string()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/auth/signin",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Sign up and register a supplier. Returns the token and supplier id.
    pub async fn owner_with_supplier(&self, email: &str, name: &str) -> (String, String) {
        let token = self.sign_up(email).await;
        let (status, body) = self
            .send(
                "POST",
                "/api/supplier",
                Some(&token),
                Some(json!({ "name": name, "matriculeFiscale": "1234567/A/M/000" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "supplier create failed: {body}");
        (token, body["id"].as_str().unwrap().to_string())
    }
}
