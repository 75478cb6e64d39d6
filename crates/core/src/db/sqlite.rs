use std::collections::{HashSet, VecDeque};
use std::iter;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteArguments, SqliteConnection};
use sqlx::{Arguments, Row, SqlitePool};
use tracing::{debug, info};

use crate::config::{DatabaseConfig, DeletePolicy};
use crate::error::{DirectoryError, Result};
use crate::models::{session::UserSession, user::User, NewRecord, Record, RecordPatch};

use super::repository::{
    DirectoryRepository, RecordRepository, SessionRepository, UserRepository,
};
use super::schema::{self, Column, Table, TABLES};
use super::value::{unknown_column, Filter, Value};

const SESSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The directory store: a connection pool plus the delete policy.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    delete_policy: DeletePolicy,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool, delete_policy: DeletePolicy) -> Self {
        Self {
            pool,
            delete_policy,
        }
    }

    /// Open (creating if needed) and migrate the database described by `config`.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = super::connect_sqlite(config).await?;
        info!(
            path = %config.path,
            max_connections = config.max_connections,
            recycle_seconds = config.pool_recycle_seconds,
            "opened provider directory database"
        );
        Ok(Self::new(pool, config.delete_policy))
    }

    /// Open a private in-memory directory.
    pub async fn open_in_memory(delete_policy: DeletePolicy) -> Result<Self> {
        let pool = super::connect_sqlite_memory().await?;
        Ok(Self::new(pool, delete_policy))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Close every pooled connection. Later calls on any clone fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("closed provider directory database");
    }
}

impl DirectoryRepository for SqliteRepository {}

/// Validated `(column, value)` pairs, in bind order.
type Assignments = Vec<(&'static Column, Value)>;

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn arguments<'q, 'a, I>(values: I) -> Result<SqliteArguments<'q>>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut args = SqliteArguments::default();
    for value in values {
        let added = match value {
            Value::Null => args.add(None::<String>),
            Value::Text(s) => args.add(s.clone()),
            Value::Integer(i) => args.add(*i),
            Value::Real(f) => args.add(*f),
            Value::Bool(b) => args.add(*b),
            Value::Date(d) => args.add(*d),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Blank text is stored as NULL.
fn normalize(value: Value) -> Value {
    match value {
        Value::Text(s) if s.trim().is_empty() => Value::Null,
        other => other,
    }
}

fn required_error(table: &Table, column: &Column) -> DirectoryError {
    DirectoryError::ConstraintViolation(format!("{}.{} is required", table.name, column.name))
}

/// Check names, kinds, required columns and text lengths without touching
/// the database. `full_row` also demands every required column be present.
fn check_columns(
    table: &'static Table,
    values: Vec<(&'static str, Value)>,
    full_row: bool,
) -> Result<Assignments> {
    let mut checked: Assignments = Vec::with_capacity(values.len());
    for (name, value) in values {
        let column = table
            .column(name)
            .ok_or_else(|| unknown_column(table, name))?;
        let value = normalize(value);
        if !value.fits(column.kind) {
            return Err(DirectoryError::ConstraintViolation(format!(
                "{}.{} expects a {:?} value",
                table.name, column.name, column.kind
            )));
        }
        if value.is_null() && column.required {
            return Err(required_error(table, column));
        }
        if let (Some(max), Value::Text(s)) = (column.max_len, &value) {
            if s.chars().count() > max {
                return Err(DirectoryError::ConstraintViolation(format!(
                    "{}.{} is longer than {max} characters",
                    table.name, column.name
                )));
            }
        }
        checked.push((column, value));
    }

    if full_row {
        let missing = table
            .columns
            .iter()
            .find(|c| c.required && !checked.iter().any(|(k, _)| k.name == c.name));
        if let Some(column) = missing {
            return Err(required_error(table, column));
        }
    }
    Ok(checked)
}

async fn check_unique(
    conn: &mut SqliteConnection,
    table: &Table,
    assignments: &Assignments,
    exclude: Option<i64>,
) -> Result<()> {
    for (column, value) in assignments {
        if !column.unique || value.is_null() {
            continue;
        }
        let mut sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            quote(table.name),
            quote(column.name)
        );
        let excluded = exclude.map(Value::Integer);
        if excluded.is_some() {
            sql.push_str(&format!(" AND {} != ?2", quote(table.id_column)));
        }
        let count: i64 =
            sqlx::query_scalar_with(&sql, arguments(iter::once(value).chain(excluded.as_ref()))?)
                .fetch_one(&mut *conn)
                .await?;
        if count > 0 {
            return Err(DirectoryError::ConstraintViolation(format!(
                "{}.{} must be unique",
                table.name, column.name
            )));
        }
    }
    Ok(())
}

async fn check_references(
    conn: &mut SqliteConnection,
    table: &Table,
    assignments: &Assignments,
) -> Result<()> {
    for (column, value) in assignments {
        let (Some(parent_name), Value::Integer(parent_id)) = (column.references, value) else {
            continue;
        };
        let Some(parent) = schema::table(parent_name) else {
            continue;
        };
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            quote(parent.name),
            quote(parent.id_column)
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(parent_id)
            .fetch_one(&mut *conn)
            .await?;
        if count == 0 {
            return Err(DirectoryError::ReferentialIntegrity(format!(
                "{}.{} references {} {parent_id}, which does not exist",
                table.name, column.name, parent.entity
            )));
        }
    }
    Ok(())
}

async fn fetch_record<R: Record>(conn: &mut SqliteConnection, id: i64) -> Result<Option<R>> {
    let table = R::TABLE;
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ?1",
        quote(table.name),
        quote(table.id_column)
    );
    let record = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(record)
}

async fn record_exists(conn: &mut SqliteConnection, table: &Table, id: i64) -> Result<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?1",
        quote(table.name),
        quote(table.id_column)
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

async fn delete_row(conn: &mut SqliteConnection, table: &Table, id: i64) -> Result<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?1",
        quote(table.name),
        quote(table.id_column)
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DirectoryError::from_sqlx(e, table.name))?;
    Ok(result.rows_affected())
}

/// Fail if any directory row still points at `table`/`id`.
async fn ensure_unreferenced(
    conn: &mut SqliteConnection,
    table: &'static Table,
    id: i64,
) -> Result<()> {
    for (dependent, column) in table.dependents() {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            quote(dependent.name),
            quote(column.name)
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        if count > 0 {
            return Err(DirectoryError::ReferentialIntegrity(format!(
                "{} {id} is still referenced by {count} {} record(s) through {}.{}",
                table.entity, dependent.entity, dependent.name, column.name
            )));
        }
    }
    Ok(())
}

/// Delete `table`/`id` and every row that requires it, transitively.
/// Optional references to a deleted row are set to NULL.
async fn cascade_delete(conn: &mut SqliteConnection, table: &'static Table, id: i64) -> Result<u64> {
    // Checked again at commit, once every doomed row is gone.
    sqlx::query("PRAGMA defer_foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    let mut queue = VecDeque::from([(table, id)]);
    let mut seen: HashSet<(&'static str, i64)> = HashSet::from([(table.name, id)]);
    let mut doomed = Vec::new();

    while let Some((current, current_id)) = queue.pop_front() {
        doomed.push((current, current_id));
        for (dependent, column) in current.dependents() {
            if column.required {
                let sql = format!(
                    "SELECT {} FROM {} WHERE {} = ?1",
                    quote(dependent.id_column),
                    quote(dependent.name),
                    quote(column.name)
                );
                let children: Vec<i64> = sqlx::query_scalar(&sql)
                    .bind(current_id)
                    .fetch_all(&mut *conn)
                    .await?;
                for child in children {
                    if seen.insert((dependent.name, child)) {
                        queue.push_back((dependent, child));
                    }
                }
            } else {
                let sql = format!(
                    "UPDATE {} SET {} = NULL WHERE {} = ?1",
                    quote(dependent.name),
                    quote(column.name),
                    quote(column.name)
                );
                let result = sqlx::query(&sql)
                    .bind(current_id)
                    .execute(&mut *conn)
                    .await?;
                if result.rows_affected() > 0 {
                    debug!(
                        table = dependent.name,
                        column = column.name,
                        rows = result.rows_affected(),
                        "cleared optional reference"
                    );
                }
            }
        }
    }

    let mut removed = 0;
    for (doomed_table, doomed_id) in doomed.into_iter().rev() {
        removed += delete_row(&mut *conn, doomed_table, doomed_id).await?;
    }
    Ok(removed)
}

#[async_trait]
impl RecordRepository for SqliteRepository {
    async fn create<N: NewRecord>(&self, new: &N) -> Result<N::Record> {
        let table = <N::Record as Record>::TABLE;
        let assignments = check_columns(table, new.values()?, true)?;

        let mut tx = self.pool.begin().await?;
        check_unique(&mut tx, table, &assignments, None).await?;
        check_references(&mut tx, table, &assignments).await?;

        let sql = if assignments.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote(table.name))
        } else {
            let columns: Vec<String> = assignments.iter().map(|(c, _)| quote(c.name)).collect();
            let placeholders: Vec<String> =
                (1..=assignments.len()).map(|i| format!("?{i}")).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote(table.name),
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        let result = sqlx::query_with(&sql, arguments(assignments.iter().map(|(_, v)| v))?)
            .execute(&mut *tx)
            .await
            .map_err(|e| DirectoryError::from_sqlx(e, table.name))?;
        let id = result.last_insert_rowid();

        let record = fetch_record::<N::Record>(&mut tx, id)
            .await?
            .ok_or(DirectoryError::NotFound {
                entity: table.entity,
                id,
            })?;
        tx.commit().await?;
        info!(table = table.name, id, "created record");
        Ok(record)
    }

    async fn get<R: Record>(&self, id: i64) -> Result<R> {
        let mut conn = self.pool.acquire().await?;
        fetch_record::<R>(&mut conn, id)
            .await?
            .ok_or(DirectoryError::NotFound {
                entity: R::TABLE.entity,
                id,
            })
    }

    async fn list<R: Record>(&self, filter: &Filter) -> Result<Vec<R>> {
        let table = R::TABLE;
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for (column, value) in filter.conditions() {
            let (name, kind) = if column == table.id_column {
                (table.id_column, schema::ColumnKind::Integer)
            } else {
                table
                    .column(column)
                    .map(|c| (c.name, c.kind))
                    .ok_or_else(|| unknown_column(table, column))?
            };
            if !value.fits(kind) {
                return Err(DirectoryError::InvalidQuery(format!(
                    "{}.{name} cannot be compared with {value:?}",
                    table.name
                )));
            }
            if value.is_null() {
                clauses.push(format!("{} IS NULL", quote(name)));
            } else {
                params.push(value);
                clauses.push(format!("{} = ?{}", quote(name), params.len()));
            }
        }

        let mut sql = format!("SELECT * FROM {}", quote(table.name));
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY {} ASC", quote(table.id_column)));

        debug!(table = table.name, conditions = clauses.len(), "listing records");
        let records = sqlx::query_as_with::<_, R, _>(&sql, arguments(params)?)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn update<P: RecordPatch>(&self, id: i64, patch: &P) -> Result<P::Record> {
        let table = <P::Record as Record>::TABLE;
        let assignments = check_columns(table, patch.changes()?, false)?;

        let mut tx = self.pool.begin().await?;
        let existing = fetch_record::<P::Record>(&mut tx, id)
            .await?
            .ok_or(DirectoryError::NotFound {
                entity: table.entity,
                id,
            })?;
        if assignments.is_empty() {
            return Ok(existing);
        }

        check_unique(&mut tx, table, &assignments, Some(id)).await?;
        check_references(&mut tx, table, &assignments).await?;

        let sets: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (c, _))| format!("{} = ?{}", quote(c.name), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote(table.name),
            sets.join(", "),
            quote(table.id_column),
            assignments.len() + 1
        );
        let id_value = Value::Integer(id);
        let args = arguments(
            assignments
                .iter()
                .map(|(_, v)| v)
                .chain(iter::once(&id_value)),
        )?;
        sqlx::query_with(&sql, args)
            .execute(&mut *tx)
            .await
            .map_err(|e| DirectoryError::from_sqlx(e, table.name))?;

        let record = fetch_record::<P::Record>(&mut tx, id)
            .await?
            .ok_or(DirectoryError::NotFound {
                entity: table.entity,
                id,
            })?;
        tx.commit().await?;
        debug!(
            table = table.name,
            id,
            columns = assignments.len(),
            "updated record"
        );
        Ok(record)
    }

    async fn delete<R: Record>(&self, id: i64) -> Result<u64> {
        let table = R::TABLE;
        let mut tx = self.pool.begin().await?;
        if !record_exists(&mut tx, table, id).await? {
            return Err(DirectoryError::NotFound {
                entity: table.entity,
                id,
            });
        }

        let removed = match self.delete_policy {
            DeletePolicy::Restrict => {
                ensure_unreferenced(&mut tx, table, id).await?;
                delete_row(&mut tx, table, id).await?
            }
            DeletePolicy::Cascade => cascade_delete(&mut tx, table, id).await?,
        };
        tx.commit()
            .await
            .map_err(|e| DirectoryError::from_sqlx(e, table.name))?;
        info!(
            table = table.name,
            id,
            removed,
            policy = ?self.delete_policy,
            "deleted record"
        );
        Ok(removed)
    }

    async fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let sql = format!("SELECT COUNT(*) FROM {}", quote(table.name));
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            counts.push((table.name, count));
        }
        Ok(counts)
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"user\" WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

fn parse_session_time(column: &str, raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    NaiveDateTime::parse_from_str(raw, SESSION_TIME_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|e| {
            DirectoryError::Database(sqlx::Error::ColumnDecode {
                index: format!("user_session.{column}"),
                source: Box::new(e),
            })
        })
}

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn create_session(&self, session: &UserSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_session (token, id_user, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at.format(SESSION_TIME_FORMAT).to_string())
        .bind(session.expires_at.format(SESSION_TIME_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::from_sqlx(e, "user_session"))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<UserSession>> {
        let row = sqlx::query(
            "SELECT token, id_user, created_at, expires_at FROM user_session WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        let created_at: String = r.get("created_at");
        let expires_at: String = r.get("expires_at");
        Ok(Some(UserSession {
            token: r.get("token"),
            user_id: r.get("id_user"),
            created_at: parse_session_time("created_at", &created_at)?,
            expires_at: parse_session_time("expires_at", &expires_at)?,
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_session WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_session WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employment::{NewEmployer, NewProviderEmployment};
    use crate::models::practice::{
        NewPracticeLocation, NewPracticeType, NewProviderActivities,
        NewProviderPracticeLocation, PracticeLocation, ProviderActivities,
        ProviderPracticeLocation,
    };
    use crate::models::provider::{
        NewProvider, NewProviderCaqh, NewProviderEducation, Provider, ProviderEducation,
        ProviderPatch,
    };
    use crate::models::referral::{
        NewProviderRelationship, NewReferralSource, NewRelationshipType, ProviderRelationship,
    };
    use crate::models::specialty::{
        NewProviderSpecialty, NewSpecialty, ProviderSpecialty, ProviderSpecialtyPatch, Specialty,
        SpecialtyPatch,
    };
    use crate::models::user::{NewRole, NewUser, Role, User, UserPatch};
    use chrono::{Duration, NaiveDate, Utc};

    async fn setup() -> SqliteRepository {
        SqliteRepository::open_in_memory(DeletePolicy::Restrict)
            .await
            .unwrap()
    }

    async fn setup_cascade() -> SqliteRepository {
        SqliteRepository::open_in_memory(DeletePolicy::Cascade)
            .await
            .unwrap()
    }

    fn sample_provider() -> NewProvider {
        NewProvider {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            birthday: NaiveDate::from_ymd_opt(1980, 2, 29),
            gender: Some("F".into()),
            ssn: Some("123456789".into()),
            npi: Some("1234567890".into()),
            work_email: Some("ada@example.org".into()),
            city: Some("Sacramento".into()),
            state: Some("CA".into()),
            ..Default::default()
        }
    }

    fn other_provider() -> NewProvider {
        NewProvider {
            first_name: Some("Grace".into()),
            last_name: Some("Hopper".into()),
            ssn: Some("987654321".into()),
            ..Default::default()
        }
    }

    async fn seed_specialty(repo: &SqliteRepository, name: &str) -> Specialty {
        repo.create(&NewSpecialty {
            specialty: name.into(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_provider() {
        let repo = setup().await;
        let created = repo.create(&sample_provider()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.first_name.as_deref(), Some("Ada"));
        assert_eq!(created.ssn.as_deref(), Some("123456789"));
        assert_eq!(created.birthday, NaiveDate::from_ymd_opt(1980, 2, 29));
        assert!(created.middle_name.is_none());

        let fetched: Provider = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let repo = setup().await;
        let a = repo.create(&sample_provider()).await.unwrap();
        let b = repo.create(&other_provider()).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = setup().await;
        let err = repo.get::<Provider>(42).await.unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::NotFound {
                entity: "provider",
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_ssn_is_constraint_violation() {
        let repo = setup().await;
        let first = repo.create(&sample_provider()).await.unwrap();

        let dup = NewProvider {
            npi: None,
            work_email: None,
            ..sample_provider()
        };
        let err = repo.create(&dup).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
        assert!(err.to_string().contains("SSN"));

        let all: Vec<Provider> = repo.list(&Filter::new()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn provider_with_only_identifiers_then_duplicate_ssn() {
        let repo = setup().await;
        let bare = NewProvider {
            ssn: Some("123456789".into()),
            npi: Some("1234567890".into()),
            ..Default::default()
        };
        let created = repo.create(&bare).await.unwrap();
        assert!(created.first_name.is_none());
        assert!(created.last_name.is_none());
        assert_eq!(created.npi.as_deref(), Some("1234567890"));

        let fetched: Provider = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);

        let dup = NewProvider {
            ssn: Some("123456789".into()),
            ..Default::default()
        };
        let err = repo.create(&dup).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
        assert!(err.to_string().contains("provider.SSN must be unique"));
    }

    #[tokio::test]
    async fn absent_unique_values_do_not_collide() {
        let repo = setup().await;
        let bare = NewProvider {
            first_name: Some("No".into()),
            last_name: Some("Identifiers".into()),
            ..Default::default()
        };
        repo.create(&bare).await.unwrap();
        repo.create(&bare).await.unwrap();
        let blank_ssn = NewProvider {
            ssn: Some("".into()),
            ..bare.clone()
        };
        let created = repo.create(&blank_ssn).await.unwrap();
        assert!(created.ssn.is_none());
    }

    #[tokio::test]
    async fn missing_required_column_is_rejected() {
        let repo = setup().await;
        let err = repo
            .create(&NewSpecialty {
                specialty: "   ".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
        assert!(err.to_string().contains("specialty.specialty is required"));
    }

    #[tokio::test]
    async fn overlong_text_is_rejected() {
        let repo = setup().await;
        let err = repo
            .create(&NewProvider {
                zip: Some("12345-67890".into()),
                ..sample_provider()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
        assert!(err.to_string().contains("provider.zip"));
    }

    #[tokio::test]
    async fn specialty_names_are_unique() {
        let repo = setup().await;
        seed_specialty(&repo, "Cardiology").await;
        let err = repo
            .create(&NewSpecialty {
                specialty: "Cardiology".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn link_to_missing_provider_is_referential_error() {
        let repo = setup().await;
        let specialty = seed_specialty(&repo, "Oncology").await;
        let err = repo
            .create(&NewProviderSpecialty::new(999, specialty.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ReferentialIntegrity(_)));
        assert!(err.to_string().contains("provider 999"));

        let links: Vec<ProviderSpecialty> = repo.list(&Filter::new()).await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn provider_specialty_flags_default_true() {
        let repo = setup().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let specialty = seed_specialty(&repo, "Pediatrics").await;
        let link = repo
            .create(&NewProviderSpecialty::new(provider.id, specialty.id))
            .await
            .unwrap();
        assert!(link.board_certified);
        assert!(link.primary_specialty);
    }

    #[tokio::test]
    async fn list_filters_and_orders_by_id() {
        let repo = setup().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let other = repo.create(&other_provider()).await.unwrap();
        let cardio = seed_specialty(&repo, "Cardiology").await;
        let derm = seed_specialty(&repo, "Dermatology").await;

        repo.create(&NewProviderSpecialty::new(provider.id, derm.id))
            .await
            .unwrap();
        repo.create(&NewProviderSpecialty {
            board_certified: false,
            ..NewProviderSpecialty::new(provider.id, cardio.id)
        })
        .await
        .unwrap();
        repo.create(&NewProviderSpecialty::new(other.id, cardio.id))
            .await
            .unwrap();

        let mine: Vec<ProviderSpecialty> = repo
            .list(&Filter::new().eq("id_provider", provider.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].id < mine[1].id);
        assert_eq!(mine[0].id_specialty, derm.id);

        let uncertified: Vec<ProviderSpecialty> = repo
            .list(&Filter::new().eq("board_certified", false))
            .await
            .unwrap();
        assert_eq!(uncertified.len(), 1);
        assert_eq!(uncertified[0].id_specialty, cardio.id);

        let in_ca: Vec<Provider> = repo
            .list(&Filter::new().eq("state", "CA"))
            .await
            .unwrap();
        assert_eq!(in_ca.len(), 1);

        let no_state: Vec<Provider> = repo
            .list(&Filter::new().eq("state", Value::Null))
            .await
            .unwrap();
        assert_eq!(no_state.len(), 1);
        assert_eq!(no_state[0].id, other.id);
    }

    #[tokio::test]
    async fn list_rejects_unknown_column() {
        let repo = setup().await;
        let err = repo
            .list::<Provider>(&Filter::new().eq("salary", 1i64))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let repo = setup().await;
        let created = repo.create(&sample_provider()).await.unwrap();

        let patch: ProviderPatch =
            serde_json::from_str(r#"{"middle_name": "King", "city": null}"#).unwrap();
        let updated = repo.update(created.id, &patch).await.unwrap();
        assert_eq!(updated.middle_name.as_deref(), Some("King"));
        assert!(updated.city.is_none());
        assert_eq!(updated.ssn, created.ssn);
        assert_eq!(updated.first_name, created.first_name);

        let fetched: Provider = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn empty_patch_returns_record_unchanged() {
        let repo = setup().await;
        let created = repo.create(&sample_provider()).await.unwrap();
        let same = repo
            .update(created.id, &ProviderPatch::default())
            .await
            .unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn update_uniqueness_ignores_own_row() {
        let repo = setup().await;
        let ada = repo.create(&sample_provider()).await.unwrap();
        let grace = repo.create(&other_provider()).await.unwrap();

        let keep_own = ProviderPatch {
            npi: Some(Some("1234567890".into())),
            ..Default::default()
        };
        repo.update(ada.id, &keep_own).await.unwrap();

        let err = repo.update(grace.id, &keep_own).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
        let grace_after: Provider = repo.get(grace.id).await.unwrap();
        assert!(grace_after.npi.is_none());
    }

    #[tokio::test]
    async fn update_cannot_clear_required_column() {
        let repo = setup().await;
        let specialty = seed_specialty(&repo, "Oncology").await;
        let err = repo
            .update(
                specialty.id,
                &SpecialtyPatch {
                    specialty: Some(String::new()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn update_clears_provider_names() {
        let repo = setup().await;
        let created = repo.create(&sample_provider()).await.unwrap();
        let patch: ProviderPatch =
            serde_json::from_str(r#"{"first_name": null, "last_name": ""}"#).unwrap();
        let updated = repo.update(created.id, &patch).await.unwrap();
        assert!(updated.first_name.is_none());
        assert!(updated.last_name.is_none());
        assert_eq!(updated.ssn, created.ssn);
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let repo = setup().await;
        let err = repo
            .update(7, &ProviderPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound { id: 7, .. }));
    }

    #[tokio::test]
    async fn update_to_missing_parent_is_referential_error() {
        let repo = setup().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let specialty = seed_specialty(&repo, "Neurology").await;
        let link = repo
            .create(&NewProviderSpecialty::new(provider.id, specialty.id))
            .await
            .unwrap();
        let err = repo
            .update(
                link.id,
                &ProviderSpecialtyPatch {
                    id_specialty: Some(555),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ReferentialIntegrity(_)));
    }

    #[tokio::test]
    async fn restrict_blocks_delete_of_referenced_parent() {
        let repo = setup().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let education = repo
            .create(&NewProviderEducation {
                id_provider: provider.id,
                school: Some("Stanford".into()),
                year_began: Some(1998),
                year_complete: Some(2002),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = repo.delete::<Provider>(provider.id).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ReferentialIntegrity(_)));
        assert!(repo.get::<Provider>(provider.id).await.is_ok());

        assert_eq!(
            repo.delete::<ProviderEducation>(education.id).await.unwrap(),
            1
        );
        assert_eq!(repo.delete::<Provider>(provider.id).await.unwrap(), 1);
        assert!(matches!(
            repo.get::<Provider>(provider.id).await,
            Err(DirectoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = setup().await;
        let err = repo.delete::<Specialty>(3).await.unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::NotFound {
                entity: "specialty",
                id: 3
            }
        ));
    }

    #[tokio::test]
    async fn cascade_removes_required_dependents() {
        let repo = setup_cascade().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let keep = repo.create(&other_provider()).await.unwrap();
        let specialty = seed_specialty(&repo, "Cardiology").await;
        repo.create(&NewProviderSpecialty::new(provider.id, specialty.id))
            .await
            .unwrap();
        repo.create(&NewProviderSpecialty::new(keep.id, specialty.id))
            .await
            .unwrap();
        repo.create(&NewProviderCaqh {
            id_provider: provider.id,
            added_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        })
        .await
        .unwrap();
        let source = repo.create(&NewReferralSource::default()).await.unwrap();
        let kind = repo
            .create(&NewRelationshipType {
                relationship_type: Some("Referring".into()),
            })
            .await
            .unwrap();
        repo.create(&NewProviderRelationship {
            id_provider: provider.id,
            id_referral_source: source.id,
            id_relationship_type: kind.id,
            effective_date: None,
        })
        .await
        .unwrap();

        let removed = repo.delete::<Provider>(provider.id).await.unwrap();
        assert_eq!(removed, 4);

        let links: Vec<ProviderSpecialty> = repo.list(&Filter::new()).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id_provider, keep.id);
        let relationships: Vec<ProviderRelationship> = repo.list(&Filter::new()).await.unwrap();
        assert!(relationships.is_empty());
        assert!(repo.get::<Specialty>(specialty.id).await.is_ok());
    }

    #[tokio::test]
    async fn cascade_clears_optional_references() {
        let repo = setup_cascade().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let location = repo
            .create(&NewPracticeLocation {
                practice_location: Some("North Clinic".into()),
                cao: Some("J. Smith".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let assignment = repo
            .create(&NewProviderPracticeLocation::new(location.id))
            .await
            .unwrap();
        let practice_type = repo
            .create(&NewPracticeType {
                practice_type: Some("Outpatient".into()),
            })
            .await
            .unwrap();
        let activity = repo
            .create(&NewProviderActivities {
                id_provider_practice_location: Some(assignment.id),
                id_practice_type: Some(practice_type.id),
                clinical_fte: Some(0.75),
                ..NewProviderActivities::new(provider.id)
            })
            .await
            .unwrap();

        let removed = repo.delete::<PracticeLocation>(location.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(matches!(
            repo.get::<ProviderPracticeLocation>(assignment.id).await,
            Err(DirectoryError::NotFound { .. })
        ));

        let after: ProviderActivities = repo.get(activity.id).await.unwrap();
        assert!(after.id_provider_practice_location.is_none());
        assert_eq!(after.id_practice_type, Some(practice_type.id));
        assert_eq!(after.clinical_fte, Some(0.75));
    }

    #[tokio::test]
    async fn restrict_counts_optional_references() {
        let repo = setup().await;
        let role = repo
            .create(&NewRole {
                name: "credentialing".into(),
                description: None,
            })
            .await
            .unwrap();
        repo.create(&NewUser {
            username: "clerk".into(),
            password: "pw".into(),
            role_id: Some(role.id),
            ..Default::default()
        })
        .await
        .unwrap();
        let err = repo.delete::<Role>(role.id).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ReferentialIntegrity(_)));
    }

    #[tokio::test]
    async fn employment_round_trip() {
        let repo = setup().await;
        let provider = repo.create(&sample_provider()).await.unwrap();
        let employer = repo
            .create(&NewEmployer {
                company: Some("Mercy General".into()),
                email: Some("hr@mercy.example".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let tenure = repo
            .create(&NewProviderEmployment {
                id_provider: provider.id,
                id_employer: employer.id,
                effective_date: NaiveDate::from_ymd_opt(2015, 7, 1),
                term_date: None,
            })
            .await
            .unwrap();
        assert_eq!(tenure.id_employer, employer.id);
        assert_eq!(tenure.effective_date, NaiveDate::from_ymd_opt(2015, 7, 1));
    }

    #[tokio::test]
    async fn user_password_is_hashed_and_verifiable() {
        let repo = setup().await;
        let user = repo
            .create(&NewUser {
                username: "admin".into(),
                password: "s3cret!".into(),
                is_admin: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(user.password_hash().starts_with("$argon2id$"));
        assert!(user.verify_password("s3cret!"));
        assert!(!user.verify_password("wrong"));

        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM \"user\" WHERE id_user = ?1")
                .bind(user.id)
                .fetch_one(repo.pool())
                .await
                .unwrap();
        assert_ne!(stored, "s3cret!");

        let by_name = repo.get_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(repo.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_constraint_violation() {
        let repo = setup().await;
        let new = NewUser {
            username: "admin".into(),
            password: "a".into(),
            ..Default::default()
        };
        repo.create(&new).await.unwrap();
        let err = repo.create(&new).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn user_password_change_persists() {
        let repo = setup().await;
        let user = repo
            .create(&NewUser {
                username: "clerk".into(),
                password: "old".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        repo.update(
            user.id,
            &UserPatch {
                password: Some("new".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let reloaded: User = repo.get(user.id).await.unwrap();
        assert!(reloaded.verify_password("new"));
        assert!(!reloaded.verify_password("old"));
    }

    #[tokio::test]
    async fn corrupt_session_timestamp_is_an_error() {
        let repo = setup().await;
        let user = repo
            .create(&NewUser {
                username: "admin".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO user_session (token, id_user, created_at, expires_at) VALUES ('bad', ?1, 'yesterday', 'tomorrow')",
        )
        .bind(user.id)
        .execute(repo.pool())
        .await
        .unwrap();

        let err = repo.get_session("bad").await.unwrap_err();
        assert!(matches!(err, DirectoryError::Database(_)));
        assert!(err.to_string().contains("user_session.created_at"));
    }

    #[test]
    fn parse_session_time_reads_stored_format() {
        let t = parse_session_time("expires_at", "2026-10-18 09:30:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-10-18T09:30:00+00:00");
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let repo = setup().await;
        let user = repo
            .create(&NewUser {
                username: "admin".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let now = Utc::now();
        let live = UserSession {
            token: "live-token".into(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(1),
        };
        let stale = UserSession {
            token: "stale-token".into(),
            user_id: user.id,
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
        };
        repo.create_session(&live).await.unwrap();
        repo.create_session(&stale).await.unwrap();

        let fetched = repo.get_session("live-token").await.unwrap().unwrap();
        assert_eq!(fetched.user_id, user.id);
        assert!(!fetched.is_expired());

        assert_eq!(repo.delete_expired_sessions().await.unwrap(), 1);
        assert!(repo.get_session("stale-token").await.unwrap().is_none());

        assert!(repo.delete_session("live-token").await.unwrap());
        assert!(!repo.delete_session("live-token").await.unwrap());
    }

    #[tokio::test]
    async fn table_counts_cover_every_table() {
        let repo = setup().await;
        repo.create(&sample_provider()).await.unwrap();
        let counts = repo.table_counts().await.unwrap();
        assert_eq!(counts.len(), TABLES.len());
        assert!(counts.contains(&("provider", 1)));
        assert!(counts.contains(&("specialty", 0)));
    }

    #[tokio::test]
    async fn open_file_database_and_close() {
        let dir = std::env::temp_dir().join(format!("provdir-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = DatabaseConfig {
            path: dir.join("directory.db").to_string_lossy().into_owned(),
            ..Default::default()
        };

        let repo = SqliteRepository::open(&config).await.unwrap();
        let created = repo.create(&sample_provider()).await.unwrap();
        repo.close().await;

        let reopened = SqliteRepository::open(&config).await.unwrap();
        let fetched: Provider = reopened.get(created.id).await.unwrap();
        assert_eq!(fetched.last_name.as_deref(), Some("Lovelace"));
        reopened.close().await;

        std::fs::remove_dir_all(&dir).ok();
    }
}
