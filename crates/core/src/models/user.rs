//! Console users and their roles.

use serde::{Deserialize, Serialize};

use super::common::{double_option, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{Table, ROLES, USER};
use crate::db::value::Value;
use crate::error::{DirectoryError, Result};
use crate::passwords;

/// An application user. Only the password hash is ever held.
#[derive(Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    #[sqlx(rename = "id_user")]
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    #[serde(skip)]
    password_hash: String,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub is_admin: bool,
}

impl User {
    /// The plaintext password is write-only; reading it always fails.
    pub fn password(&self) -> Result<String> {
        Err(DirectoryError::PasswordNotReadable)
    }

    /// Replace the in-memory hash with a freshly salted hash of `password`.
    ///
    /// Persist the change with a [`UserPatch`] carrying the same password.
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        self.password_hash = passwords::hash_password(password)?;
        Ok(())
    }

    /// Check a plaintext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        passwords::verify_password(&self.password_hash, password).unwrap_or(false)
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("department_id", &self.department_id)
            .field("role_id", &self.role_id)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl Record for User {
    const TABLE: &'static Table = &USER;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Sign-up input. The plaintext password is hashed before it reaches the store.
#[derive(Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl NewRecord for NewUser {
    type Record = User;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("first_name", self.first_name.clone())
            .put("last_name", self.last_name.clone())
            .put("username", self.username.clone())
            .put("password_hash", hash_required(&self.password)?)
            .put("department_id", self.department_id)
            .put("role_id", self.role_id)
            .put("is_admin", self.is_admin)
            .into_vec())
    }
}

/// Partial update of a user. A present `password` is re-hashed.
#[derive(Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub role_id: Option<Option<i64>>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl RecordPatch for UserPatch {
    type Record = User;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        let password_hash = match &self.password {
            Some(p) => Some(hash_required(p)?),
            None => None,
        };
        Ok(Columns::new()
            .set("first_name", &self.first_name)
            .set("last_name", &self.last_name)
            .set("username", &self.username)
            .set("password_hash", &password_hash)
            .set("department_id", &self.department_id)
            .set("role_id", &self.role_id)
            .set("is_admin", &self.is_admin)
            .into_vec())
    }
}

fn hash_required(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(DirectoryError::ConstraintViolation(
            "user.password is required".into(),
        ));
    }
    passwords::hash_password(password)
}

/// A named role users can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Role {
    #[sqlx(rename = "id_role")]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Record for Role {
    const TABLE: &'static Table = &ROLES;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRecord for NewRole {
    type Record = Role;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("name", self.name.clone())
            .put("description", self.description.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl RecordPatch for RolePatch {
    type Record = Role;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("name", &self.name)
            .set("description", &self.description)
            .into_vec())
    }
}
