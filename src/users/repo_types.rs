use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identity and audit columns shared by persisted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CreationMetadata {
    pub id: i64,                            // assigned by the store, never changes
    pub uuid: Uuid,                         // external identifier
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>, // soft-delete marker
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    #[sqlx(flatten)]
    pub meta: CreationMetadata,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub phone: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
}

impl User {
    pub fn id(&self) -> i64 {
        self.meta.id
    }

    pub fn uuid(&self) -> Uuid {
        self.meta.uuid
    }
}

/// Insert payload. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub is_active: bool,
}

impl NewUser {
    /// The external identifier to persist: the caller's, or a fresh v4.
    pub fn external_id(&self) -> Uuid {
        match self.uuid {
            Some(id) if !id.is_nil() => id,
            _ => Uuid::new_v4(),
        }
    }
}

/// Filters for user search. Empty filter matches every live user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    /// Case-sensitive substring over username, email and phone (OR-combined).
    pub query: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(active) = self.is_active {
            if user.is_active != active {
                return false;
            }
        }
        match self.query.as_deref() {
            Some(q) if !q.is_empty() => {
                user.username.contains(q) || user.email.contains(q) || user.phone.contains(q)
            }
            _ => true,
        }
    }
}
