use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{
    repo::{StoreError, UserStore},
    repo_types::{CreationMetadata, NewUser, User, UserFilter},
};

/// In-process store mirroring the Postgres semantics: partial unique
/// indexes on email/phone and soft deletes.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(rows: &[User]) -> impl Iterator<Item = &User> {
        rows.iter().filter(|u| u.meta.deleted_at.is_none())
    }

    fn check_unique(rows: &[User], candidate_id: i64, email: &str, phone: &str) -> Result<(), StoreError> {
        for other in Self::live(rows).filter(|u| u.id() != candidate_id) {
            if other.email == email {
                return Err(StoreError::Duplicate("users_email_live_key".into()));
            }
            if other.phone == phone {
                return Err(StoreError::Duplicate("users_phone_live_key".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().expect("store lock");
        Self::check_unique(&rows, 0, &user.email, &user.phone)?;

        let now = OffsetDateTime::now_utc();
        let created = User {
            meta: CreationMetadata {
                id: rows.len() as i64 + 1,
                uuid: user.external_id(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            is_active: user.is_active,
            refresh_token: None,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().expect("store lock");
        let found = Self::live(&rows).find(|u| u.id() == id).cloned();
        Ok(found)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().expect("store lock");
        let found = Self::live(&rows).find(|u| u.username == username).cloned();
        Ok(found)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = self.rows.lock().expect("store lock");
        let all = Self::live(&rows).cloned().collect();
        Ok(all)
    }

    async fn search(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let rows = self.rows.lock().expect("store lock");
        let matched = Self::live(&rows).filter(|u| filter.matches(u)).cloned().collect();
        Ok(matched)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().expect("store lock");
        Self::check_unique(&rows, user.id(), &user.email, &user.phone)?;

        let row = rows
            .iter_mut()
            .find(|u| u.id() == user.id() && u.meta.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        let meta = CreationMetadata {
            updated_at: OffsetDateTime::now_utc(),
            ..row.meta.clone()
        };
        *row = User {
            meta,
            ..user.clone()
        };
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("store lock");
        let row = rows
            .iter_mut()
            .find(|u| u.id() == id && u.meta.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        row.meta.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str, phone: &str) -> NewUser {
        NewUser {
            uuid: None,
            first_name: "Edsger".into(),
            last_name: "Dijkstra".into(),
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: phone.into(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn lookups_hide_soft_deleted_rows() {
        let store = InMemoryUserStore::new();
        let user = store
            .create(new_user("edsger", "ewd@utexas.edu", "+15125550100"))
            .await
            .expect("create");

        let by_id = store.find_by_id(user.id()).await.expect("find_by_id");
        assert_eq!(by_id.map(|u| u.username), Some("edsger".to_string()));
        let by_name = store.find_by_username("edsger").await.expect("find_by_username");
        assert_eq!(by_name.map(|u| u.id()), Some(user.id()));

        store.delete(user.id()).await.expect("delete");
        assert!(store.find_by_id(user.id()).await.expect("find_by_id").is_none());
        assert!(store.find_by_username("edsger").await.expect("find_by_username").is_none());
        assert!(store.find_all().await.expect("find_all").is_empty());
    }
}
