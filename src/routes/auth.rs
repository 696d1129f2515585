use axum::routing::{get, patch, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/signin", post(handlers::sign_in))
        .route("/auth/signout", post(handlers::sign_out))
        .route("/auth/password-reset", post(handlers::request_password_reset))
        .route(
            "/auth/password-reset/confirm",
            post(handlers::confirm_password_reset),
        )
        .route("/auth/session", get(handlers::current_session))
        .route("/auth/password", post(handlers::change_password))
        .route("/auth/profile", patch(handlers::update_profile))
}
