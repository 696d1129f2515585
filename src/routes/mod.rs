pub mod auth;
pub mod categories;
pub mod geocode;
pub mod health;
pub mod products;
pub mod supplier;
pub mod users;

use axum::Router;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::models::{now, Supplier};
use crate::state::AppState;
use crate::store::{diff_fields, to_fields, JsonMap};

/// The full HTTP surface with tracing and CORS applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(supplier::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(users::router())
        .merge(geocode::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The caller's supplier. Everything under `/api/categories` and
/// `/api/products` is scoped to it.
pub(crate) async fn require_supplier(state: &AppState, user: &CurrentUser) -> AppResult<Supplier> {
    state
        .catalog
        .suppliers
        .first_by_owner(&user.id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Fields of `input` that differ from `current`, stamped with `updatedAt`.
/// Empty when nothing would change.
pub(crate) fn changed_fields<C: Serialize, I: Serialize>(
    current: &C,
    input: &I,
) -> AppResult<JsonMap> {
    let mut changes = diff_fields(&to_fields(current)?, to_fields(input)?);
    if !changes.is_empty() {
        changes.insert("updatedAt".to_string(), Value::String(now()));
    }
    Ok(changes)
}
