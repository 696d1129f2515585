use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::{accounts, session};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::models::{now, User, UserInput, UserStatus};
use crate::routes::changed_fields;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list).post(create))
        .route("/api/users/{id}", get(get_one).patch(update).delete(delete))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<User>>> {
    let users = &state.catalog.users;
    let found = match query.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => users.get_by_email(email).await?,
        _ => users.list().await?,
    };
    Ok(Json(found))
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<UserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.catalog.users.create(&User::new(input, &now())).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    state
        .catalog
        .users
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Whether `id` names a profile that belongs to a sign-in account.
fn is_account_profile(state: &AppState, id: &str) -> AppResult<bool> {
    Ok(accounts::find_by_id(&state.db, id)?.is_some())
}

/// Account-backed profiles keep their email in step with the account, and
/// only their own account may change their status.
async fn update(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<UserInput>,
) -> AppResult<Json<User>> {
    let users = &state.catalog.users;
    let user = users.get_by_id(&id).await?.ok_or(AppError::NotFound)?;

    let changes = changed_fields(&user, &input)?;
    if changes.is_empty() {
        return Ok(Json(user));
    }

    if is_account_profile(&state, &id)? {
        if changes.contains_key("status") && caller.id != id {
            return Err(AppError::Forbidden(
                "Only the account owner can change this status".to_string(),
            ));
        }
        if changes.contains_key("email") {
            return Err(AppError::BadRequest(
                "Account emails are changed through /auth/profile".to_string(),
            ));
        }
    }

    users.update(&id, changes).await?;

    // A suspended profile loses any live sessions of the account sharing its id.
    if input.status == Some(UserStatus::Suspended) && user.status != UserStatus::Suspended {
        let revoked = session::delete_account_sessions(&state.db, &id)?;
        tracing::info!(user_id = %id, revoked, "User suspended");
    }

    let updated = users.get_by_id(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

async fn delete(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if caller.id != id && is_account_profile(&state, &id)? {
        return Err(AppError::Forbidden(
            "Only the account owner can delete this profile".to_string(),
        ));
    }
    if !state.catalog.users.delete(&id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
