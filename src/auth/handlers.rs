use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{accounts, session, AuthError};
use crate::db::models::Account;
use crate::error::{AppError, AppResult};
use crate::extractors::{self, CurrentUser, MaybeUser};
use crate::models::{now, User, UserInput, UserStatus};
use crate::routes::changed_fields;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub cin: Option<String>,
    pub image_url: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Profile page form. Absent fields are left untouched.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

/// What the dashboard keeps as its current user: the account merged with
/// its profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub account: Account,
    pub profile: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

async fn start_session(
    state: &AppState,
    account: Account,
    status: StatusCode,
) -> AppResult<Response> {
    let token = session::create_session(&state.db, &account.id, state.config.auth.session_hours)?;
    let profile = state.catalog.users.get_by_id(&account.id).await?;

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );
    let body = json!({
        "token": token,
        "user": SessionView { account, profile, expires_at: None },
    });

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// -- Handlers --

/// POST /auth/signup: creates the account, its profile record and a session
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<Response> {
    let account = accounts::create_account(
        &state.db,
        &req.email,
        &req.password,
        state.config.auth.password_cost,
    )?;

    let now = now();
    let profile = User::new(
        UserInput {
            full_name: req.full_name,
            email: Some(account.email.clone()),
            phone: req.phone,
            cin: req.cin,
            address: req.address,
            image_url: req.image_url,
            status: Some(UserStatus::Active),
        },
        &now,
    );
    state
        .catalog
        .users
        .create_with_id(&account.id, &profile)
        .await?;

    start_session(&state, account, StatusCode::CREATED).await
}

/// POST /auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Response> {
    let account = accounts::verify_credentials(&state.db, &req.email, &req.password)?;

    if let Some(profile) = state.catalog.users.get_by_id(&account.id).await? {
        if profile.status == UserStatus::Suspended {
            tracing::warn!(account_id = %account.id, "Sign-in refused for suspended account");
            return Err(AuthError::UserDisabled.into());
        }
    }

    accounts::record_sign_in(&state.db, &account.id)?;
    tracing::info!(account_id = %account.id, "Signed in");
    start_session(&state, account, StatusCode::OK).await
}

/// POST /auth/signout: drops the session and clears the cookie
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = extractors::session_token(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
    )
        .into_response())
}

/// POST /auth/password-reset: issues a reset token. Delivery is left to the
/// operator; the token is written to the log.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> AppResult<Response> {
    let token = accounts::create_reset_token(
        &state.db,
        &req.email,
        state.config.auth.reset_token_minutes,
    )?;
    tracing::info!(email = %req.email.trim(), %token, "Password reset requested");

    Ok((StatusCode::ACCEPTED, Json(json!({ "sent": true }))).into_response())
}

/// POST /auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetConfirmRequest>,
) -> AppResult<Response> {
    accounts::reset_password(
        &state.db,
        &req.token,
        &req.password,
        state.config.auth.password_cost,
    )?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /auth/password: change the password of the signed-in account
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    accounts::change_password(
        &state.db,
        &user.id,
        &req.current_password,
        &req.new_password,
        state.config.auth.password_cost,
        &user.token,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /auth/profile: update the account email and the profile record
/// together, creating the profile if it is missing.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> AppResult<Json<SessionView>> {
    let mut account = accounts::find_by_id(&state.db, &user.id)?.ok_or(AppError::Unauthorized)?;
    if let Some(email) = req.email.as_deref() {
        if email.trim() != account.email {
            account = accounts::update_email(&state.db, &user.id, email)?;
        }
    }

    let input = UserInput {
        full_name: req.full_name,
        email: Some(account.email.clone()),
        phone: req.phone,
        address: req.address,
        image_url: req.image_url,
        ..Default::default()
    };

    let users = &state.catalog.users;
    let profile = match users.get_by_id(&user.id).await? {
        Some(profile) => {
            let changes = changed_fields(&profile, &input)?;
            if !changes.is_empty() {
                users.update(&user.id, changes).await?;
            }
            users.get_by_id(&user.id).await?
        }
        None => Some(users.create_with_id(&user.id, &User::new(input, &now())).await?),
    };
    let expires_at = session::find_session(&state.db, &user.token)?.map(|s| s.expires_at);

    Ok(Json(SessionView {
        account,
        profile,
        expires_at,
    }))
}

/// GET /auth/session: the current user, or null
pub async fn current_session(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
) -> AppResult<Json<Option<SessionView>>> {
    let Some(user) = maybe_user.0 else {
        return Ok(Json(None));
    };

    let account = accounts::find_by_id(&state.db, &user.id)?.ok_or(AppError::Unauthorized)?;
    let profile = state.catalog.users.get_by_id(&user.id).await?;
    let expires_at = session::find_session(&state.db, &user.token)?.map(|s| s.expires_at);

    Ok(Json(Some(SessionView {
        account,
        profile,
        expires_at,
    })))
}
