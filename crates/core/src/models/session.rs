use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A console login session, keyed by an opaque random token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
