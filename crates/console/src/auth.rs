//! Console authentication middleware and handlers.
//!
//! Users sign in with their directory username and password. A successful
//! login stores a random session token server-side and in an HttpOnly cookie.

use std::sync::Arc;

use askama::Template;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{info, warn};

use provdir_core::auth::{authenticate, load_user};
use provdir_core::db::repository::SessionRepository;
use provdir_core::error::DirectoryError;
use provdir_core::models::session::UserSession;
use provdir_core::models::user::User;

use crate::AppState;

pub(crate) const SESSION_COOKIE_NAME: &str = "provdir_session";

/// Paths that bypass authentication.
const PUBLIC_PATHS: &[&str] = &["/health", "/login"];

/// The signed-in user, attached to the request by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Extract session token from cookie header.
fn extract_session_token(req: &Request<Body>) -> Option<String> {
    let cookie_header = req.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
            return Some(value.to_string());
        }
    }
    None
}

/// Login-required gate. Requests without a live session go to `/login`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    if let Some(token) = extract_session_token(&req) {
        match state.repo.get_session(&token).await {
            Ok(Some(session)) if !session.is_expired() => {
                if let Ok(Some(user)) = load_user(&state.repo, session.user_id).await {
                    req.extensions_mut().insert(CurrentUser(user));
                    return next.run(req).await;
                }
            }
            Ok(Some(_)) => {
                if let Err(e) = state.repo.delete_session(&token).await {
                    warn!("failed to remove expired session: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("session lookup failed: {e}"),
        }
    }

    Redirect::to("/login").into_response()
}

/// Session length and cookie `Max-Age` in seconds, or `None` if either overflows.
fn session_lifetime(hours: i64) -> Option<(Duration, i64)> {
    let lifetime = Duration::try_hours(hours)?;
    let max_age = hours.checked_mul(3600)?;
    Some((lifetime, max_age))
}

/// Generate a random session token (64 hex characters).
fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    hex::encode(&bytes)
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

// -- Templates --

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
}

impl LoginTemplate {
    fn failed(error: &str, username: String) -> Response {
        Self {
            error: Some(error.to_string()),
            username,
        }
        .into_response()
    }
}

// -- Handlers --

/// GET /login - Show login form.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate {
        error: None,
        username: String::new(),
    }
}

#[derive(serde::Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login - Check credentials and open a session.
pub async fn login_submit(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let body_bytes = match axum::body::to_bytes(req.into_body(), 1024 * 16).await {
        Ok(b) => b,
        Err(_) => return LoginTemplate::failed("Invalid request", String::new()),
    };

    let form: LoginForm = match serde_urlencoded::from_bytes(&body_bytes) {
        Ok(f) => f,
        Err(_) => return LoginTemplate::failed("Invalid form data", String::new()),
    };

    let user = match authenticate(&state.repo, &form.username, &form.password).await {
        Ok(user) => user,
        Err(DirectoryError::Authentication(_)) => {
            warn!(username = %form.username, "failed login attempt");
            return LoginTemplate::failed("Invalid username or password", form.username);
        }
        Err(e) => {
            warn!("login failed: {e}");
            return LoginTemplate::failed("Internal error", form.username);
        }
    };

    if let Err(e) = state.repo.delete_expired_sessions().await {
        warn!("failed to purge expired sessions: {e}");
    }

    let hours = state.config.console.session_hours;
    let now = Utc::now();
    let Some((lifetime, max_age)) = session_lifetime(hours) else {
        warn!(session_hours = hours, "session length out of range");
        return LoginTemplate::failed("Internal error", form.username);
    };
    let Some(expires_at) = now.checked_add_signed(lifetime) else {
        warn!(session_hours = hours, "session expiry out of range");
        return LoginTemplate::failed("Internal error", form.username);
    };
    let token = generate_session_token();
    let session = UserSession {
        token: token.clone(),
        user_id: user.id,
        created_at: now,
        expires_at,
    };

    if let Err(e) = state.repo.create_session(&session).await {
        warn!("failed to create session: {e}");
        return LoginTemplate::failed("Internal error", form.username);
    }
    info!(user_id = user.id, "user signed in");

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );

    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/".to_string()),
        ],
    )
        .into_response()
}

/// POST /logout - Delete session and redirect to login.
pub async fn logout(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    if let Some(token) = extract_session_token(&req) {
        if let Err(e) = state.repo.delete_session(&token).await {
            warn!("failed to remove session on logout: {e}");
        }
    }

    let cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");

    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/login".to_string()),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_session_token_is_64_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_session_token_is_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/login"));
        assert!(!is_public_path("/"));
        assert!(!is_public_path("/logout"));
        assert!(!is_public_path("/api/v1/provider"));
    }

    #[test]
    fn session_lifetime_in_range() {
        let (lifetime, max_age) = session_lifetime(24).unwrap();
        assert_eq!(lifetime, Duration::hours(24));
        assert_eq!(max_age, 86_400);
    }

    #[test]
    fn session_lifetime_rejects_overflow() {
        assert!(session_lifetime(i64::MAX / 1000).is_none());
        assert!(session_lifetime(i64::MAX).is_none());
    }

    #[test]
    fn hex_encode_works() {
        assert_eq!(hex::encode(&[0x00, 0xff, 0x0a]), "00ff0a");
        assert_eq!(hex::encode(&[]), "");
    }

    #[test]
    fn extract_session_token_from_cookie() {
        let req = Request::builder()
            .header(header::COOKIE, "provdir_session=abc123; other=value")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&req), Some("abc123".to_string()));
    }

    #[test]
    fn extract_session_token_missing_cookie() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_session_token(&req), None);
    }

    #[test]
    fn extract_session_token_no_matching_cookie() {
        let req = Request::builder()
            .header(header::COOKIE, "other=value; another=thing")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&req), None);
    }
}
