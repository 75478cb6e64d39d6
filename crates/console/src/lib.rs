//! Provider Directory Console — sign-in, landing page and the JSON API.

pub mod api;
pub mod auth;

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use provdir_core::config::DirectoryConfig;
use provdir_core::db::repository::RecordRepository;
use provdir_core::db::sqlite::SqliteRepository;
use tracing::warn;

use auth::CurrentUser;

/// Shared application state for all console routes.
pub struct AppState {
    pub repo: SqliteRepository,
    pub config: DirectoryConfig,
}

/// Build the console router with all routes behind the login gate.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .nest("/api/v1", api::api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

struct TableCountView {
    name: String,
    count: i64,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    instance_name: String,
    display_name: String,
    is_admin: bool,
    tables: Vec<TableCountView>,
}

async fn index(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> IndexTemplate {
    let tables = match state.repo.table_counts().await {
        Ok(counts) => counts
            .into_iter()
            .map(|(name, count)| TableCountView {
                name: name.to_string(),
                count,
            })
            .collect(),
        Err(e) => {
            warn!("failed to count records: {e}");
            Vec::new()
        }
    };

    let display_name = match (&user.first_name, &user.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(name), None) | (None, Some(name)) => name.clone(),
        (None, None) => user.username.clone(),
    };

    IndexTemplate {
        instance_name: state.config.directory.instance_name.clone(),
        display_name,
        is_admin: user.is_admin,
        tables,
    }
}
