use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use super::repo_types::{NewUser, User, UserFilter};

const USER_COLUMNS: &str = r#"
    id, uuid, created_at, updated_at, deleted_at,
    first_name, last_name, username, email, password_hash, phone,
    is_active, refresh_token
"#;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value violates {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for users. Soft-deleted rows are invisible to
/// every read.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    async fn search(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
    async fn update(&self, user: &User) -> Result<User, StoreError>;
    /// Sets `deleted_at`; `NotFound` when no live row has this id.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
            return StoreError::Duplicate(constraint);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let uuid = user.external_id();
        let sql = format!(
            r#"
            INSERT INTO users (uuid, first_name, last_name, username, email, password_hash, phone, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(uuid)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone)
            .bind(user.is_active)
            .fetch_one(&self.db)
            .await
            .map_err(map_write_error)?;
        debug!(user_id = created.id(), "user row inserted");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            ORDER BY id
            LIMIT 1
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await?;
        Ok(users)
    }

    async fn search(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        // strpos keeps the match a literal, case-sensitive substring.
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
              AND ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::TEXT IS NULL
                   OR strpos(username, $2) > 0
                   OR strpos(email, $2) > 0
                   OR strpos(phone, $2) > 0)
            ORDER BY id
            "#
        );
        let query = filter.query.as_deref().filter(|q| !q.is_empty());
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filter.is_active)
            .bind(query)
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, username = $4, email = $5,
                password_hash = $6, phone = $7, is_active = $8, refresh_token = $9,
                updated_at = $10
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id())
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone)
            .bind(user.is_active)
            .bind(&user.refresh_token)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(&self.db)
            .await
            .map_err(map_write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        debug!(user_id = id, "user soft-deleted");
        Ok(())
    }
}
