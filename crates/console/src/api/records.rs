//! Generic JSON handlers shared by every directory table.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

use provdir_core::db::repository::RecordRepository;
use provdir_core::db::value::Filter;
use provdir_core::error::DirectoryError;
use provdir_core::models::{NewRecord, Record, RecordPatch};

use crate::auth::CurrentUser;
use crate::AppState;

/// A failed API call, rendered as `{"error": ..., "kind": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Directory(DirectoryError),
    Forbidden,
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        ApiError::Directory(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, kind) = match self {
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "administrator privileges required".to_string(),
                "forbidden",
            ),
            ApiError::Directory(err) => {
                let status = match &err {
                    DirectoryError::ConstraintViolation(_)
                    | DirectoryError::ReferentialIntegrity(_) => StatusCode::CONFLICT,
                    DirectoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                    DirectoryError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                    DirectoryError::Authentication(_) => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!("request failed: {err}");
                }
                (status, err.to_string(), err.kind())
            }
        };
        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

fn require_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.0.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Routes for one table, mounted at `/<table>` and `/<table>/:id`.
pub fn table_routes<N, P>() -> Router<Arc<AppState>>
where
    N: NewRecord + DeserializeOwned,
    P: RecordPatch<Record = N::Record> + DeserializeOwned,
{
    let base = format!("/{}", <N::Record as Record>::TABLE.name);
    Router::new()
        .route(
            &base,
            get(list_records::<N::Record>).post(create_record::<N>),
        )
        .route(
            &format!("{base}/:id"),
            get(get_record::<N::Record>)
                .patch(update_record::<P>)
                .delete(delete_record::<N::Record>),
        )
}

async fn list_records<R: Record>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<R>>, ApiError> {
    let filter = Filter::from_params(R::TABLE, params)?;
    let records = state.repo.list::<R>(&filter).await?;
    Ok(Json(records))
}

async fn get_record<R: Record>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<R>, ApiError> {
    let record = state.repo.get::<R>(id).await?;
    Ok(Json(record))
}

async fn create_record<N>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(new): Json<N>,
) -> Result<(StatusCode, Json<N::Record>), ApiError>
where
    N: NewRecord + DeserializeOwned,
{
    require_admin(&user)?;
    let record = state.repo.create(&new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record<P>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(patch): Json<P>,
) -> Result<Json<P::Record>, ApiError>
where
    P: RecordPatch + DeserializeOwned,
{
    require_admin(&user)?;
    let record = state.repo.update(id, &patch).await?;
    Ok(Json(record))
}

async fn delete_record<R: Record>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&user)?;
    let removed = state.repo.delete::<R>(id).await?;
    Ok(Json(json!({ "deleted": removed })))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn error_status_mapping() {
        let cases = [
            (
                DirectoryError::ConstraintViolation("dup".into()),
                StatusCode::CONFLICT,
                "constraint_violation",
            ),
            (
                DirectoryError::ReferentialIntegrity("orphan".into()),
                StatusCode::CONFLICT,
                "referential_integrity",
            ),
            (
                DirectoryError::NotFound {
                    entity: "provider",
                    id: 1,
                },
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                DirectoryError::InvalidQuery("bad".into()),
                StatusCode::BAD_REQUEST,
                "invalid_query",
            ),
            (
                DirectoryError::Authentication("no".into()),
                StatusCode::UNAUTHORIZED,
                "authentication",
            ),
            (
                DirectoryError::Config("broken".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "config",
            ),
        ];
        for (err, status, kind) in cases {
            let message = err.to_string();
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            let body = body_json(response).await;
            assert_eq!(body["kind"], kind);
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn forbidden_body() {
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["kind"], "forbidden");
    }
}
