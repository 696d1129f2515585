use axum::extract::FromRequestParts;
use axum::http::{header, HeaderMap};
use axum::http::request::Parts;

use crate::auth::session;
use crate::error::AppError;
use crate::state::AppState;

/// Represents the currently authenticated account. `id` is the owner id
/// every supplier-scoped query filters on.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let account =
            session::account_for_token(&state.db, &token)?.ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id: account.id,
            email: account.email,
            token,
        })
    }
}

/// Optional user extractor. Yields None instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Session token from the session cookie, or from an `Authorization: Bearer`
/// header for non-browser clients.
pub fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[test]
    fn reads_named_cookie() {
        let p = headers(&[("cookie", "theme=dark; fournisseur_session=abc123; lang=fr")]);
        assert_eq!(session_token(&p, "fournisseur_session"), Some("abc123"));
        assert_eq!(session_token(&p, "other"), None);
    }

    #[test]
    fn falls_back_to_bearer() {
        let p = headers(&[("authorization", "Bearer tok-456")]);
        assert_eq!(session_token(&p, "fournisseur_session"), Some("tok-456"));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let p = headers(&[
            ("cookie", "fournisseur_session=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(session_token(&p, "fournisseur_session"), Some("from-cookie"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let p = headers(&[
            ("cookie", "fournisseur_session="),
            ("authorization", "Basic dXNlcjpwYXNz"),
        ]);
        assert_eq!(session_token(&p, "fournisseur_session"), None);
    }
}
