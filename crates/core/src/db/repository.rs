use async_trait::async_trait;

use super::value::Filter;
use crate::error::Result;
use crate::models::{session::UserSession, user::User, NewRecord, Record, RecordPatch};

/// Create, read, update and delete for every directory entity.
///
/// Each call runs in its own transaction and either applies fully or not at
/// all.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Validate and insert a record, returning it with its assigned id.
    async fn create<N: NewRecord>(&self, new: &N) -> Result<N::Record>;

    /// Fetch one record by id. A missing id is `NotFound`.
    async fn get<R: Record>(&self, id: i64) -> Result<R>;

    /// Records matching every condition of `filter`, ordered by id.
    async fn list<R: Record>(&self, filter: &Filter) -> Result<Vec<R>>;

    /// Apply the fields present in `patch` and return the updated record.
    async fn update<P: RecordPatch>(&self, id: i64, patch: &P) -> Result<P::Record>;

    /// Remove a record under the configured delete policy. Returns the number
    /// of rows removed, dependents included.
    async fn delete<R: Record>(&self, id: i64) -> Result<u64>;

    /// Row count of every directory table, in schema order.
    async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &UserSession) -> Result<()>;
    async fn get_session(&self, token: &str) -> Result<Option<UserSession>>;
    async fn delete_session(&self, token: &str) -> Result<bool>;
    async fn delete_expired_sessions(&self) -> Result<u64>;
}

/// Combined repository trait covering everything the directory stores.
pub trait DirectoryRepository: RecordRepository + UserRepository + SessionRepository {}
