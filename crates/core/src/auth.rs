//! Username/password authentication against stored users.

use crate::db::repository::{RecordRepository, UserRepository};
use crate::error::{DirectoryError, Result};
use crate::models::user::User;

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Authenticate a user by username and password.
///
/// An unknown username and a wrong password fail with the same message.
pub async fn authenticate<R>(repo: &R, username: &str, password: &str) -> Result<User>
where
    R: UserRepository + ?Sized,
{
    let user = repo
        .get_user_by_username(username.trim())
        .await?
        .ok_or_else(|| DirectoryError::Authentication(INVALID_CREDENTIALS.into()))?;

    if !user.verify_password(password) {
        tracing::debug!(user_id = user.id, "password mismatch");
        return Err(DirectoryError::Authentication(INVALID_CREDENTIALS.into()));
    }

    Ok(user)
}

/// Resolve a user id held by a session. A missing user is `None`.
pub async fn load_user<R>(repo: &R, id: i64) -> Result<Option<User>>
where
    R: RecordRepository,
{
    match repo.get::<User>(id).await {
        Ok(user) => Ok(Some(user)),
        Err(DirectoryError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
