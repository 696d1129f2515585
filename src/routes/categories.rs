use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::CatalogError;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::models::{now, Category, CategoryInput, Supplier};
use crate::routes::{changed_fields, require_supplier};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub search: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route(
            "/api/categories/{id}",
            get(get_one).patch(update).delete(delete),
        )
        .route("/api/categories/{id}/products/count", get(products_count))
}

/// A category of the caller's supplier. Other suppliers' categories are
/// reported as missing.
async fn owned_category(state: &AppState, supplier: &Supplier, id: &str) -> AppResult<Category> {
    match state.catalog.categories.get_by_id(id).await? {
        Some(category) if category.supplier_id == supplier.id => Ok(category),
        _ => Err(AppError::NotFound),
    }
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let supplier = require_supplier(&state, &user).await?;
    let categories = &state.catalog.categories;

    let found = match query.search.as_deref() {
        Some(term) if !term.is_empty() => categories.search_by_title(&supplier.id, term).await?,
        _ => categories.get_by_supplier(&supplier.id).await?,
    };
    Ok(Json(found))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    if input.title.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(CatalogError::MissingField("title").into());
    }

    let supplier = require_supplier(&state, &user).await?;
    let category = state
        .catalog
        .categories
        .create(&Category::new(&supplier.id, input, &now()))
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let supplier = require_supplier(&state, &user).await?;
    Ok(Json(owned_category(&state, &supplier, &id).await?))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    if matches!(input.title.as_deref().map(str::trim), Some("")) {
        return Err(CatalogError::MissingField("title").into());
    }

    let supplier = require_supplier(&state, &user).await?;
    let category = owned_category(&state, &supplier, &id).await?;
    let changes = changed_fields(&category, &input)?;
    if changes.is_empty() {
        return Ok(Json(category));
    }

    let categories = &state.catalog.categories;
    categories.update(&id, changes).await?;
    let updated = categories.get_by_id(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

/// Removes the category and every product filed under it, products first.
async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let supplier = require_supplier(&state, &user).await?;
    owned_category(&state, &supplier, &id).await?;

    let products = state.catalog.products.delete_by_category(&id).await?;
    state.catalog.categories.delete(&id).await?;
    tracing::info!(category_id = %id, products, "Category deleted with its products");

    Ok(StatusCode::NO_CONTENT)
}

async fn products_count(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let supplier = require_supplier(&state, &user).await?;
    owned_category(&state, &supplier, &id).await?;
    let count = state.catalog.categories.products_count(&id).await?;
    Ok(Json(json!({ "count": count })))
}
