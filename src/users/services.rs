use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};

use super::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User, UserFilter},
};
use crate::{
    auth::{
        jwt::{Claims, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::AppError,
    state::AppState,
};

/// Registration input carrying the plaintext password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// An authenticated session: the user plus a freshly signed token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub claims: Claims,
}

/// Orchestrates the store, the password hasher and the token issuer.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        UserService::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

fn not_found_as(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound => AppError::NotFound,
        other => AppError::Persistence(other),
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    #[instrument(skip(self, reg), fields(username = %reg.username))]
    pub async fn register(&self, reg: Registration) -> Result<User, AppError> {
        let password_hash = hash_password(&reg.password)?;
        let user = self
            .store
            .create(NewUser {
                uuid: None,
                first_name: reg.first_name,
                last_name: reg.last_name,
                username: reg.username,
                email: reg.email,
                password_hash,
                phone: reg.phone,
                is_active: true,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "user insert rejected");
                AppError::Persistence(e)
            })?;
        info!(user_id = user.id(), "user registered");
        Ok(user)
    }

    /// `NotFound` for an unknown username, `Unauthorized` for a wrong
    /// password. Callers must not expose the difference.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id(), "login invalid password");
            return Err(AppError::Unauthorized);
        }

        let (token, claims) = self.keys.issue(&user)?;
        info!(user_id = user.id(), "user logged in");
        Ok(Session {
            user,
            token,
            claims,
        })
    }

    /// Validates the presented token, confirms the user still exists and
    /// issues a fresh token for it.
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.keys.validate(token)?;
        let user = self.store.find_by_id(claims.id).await?.ok_or_else(|| {
            warn!(user_id = claims.id, "refresh for missing user");
            AppError::Unauthorized
        })?;
        let (token, claims) = self.keys.issue(&user)?;
        info!(user_id = user.id(), "session refreshed");
        Ok(Session {
            user,
            token,
            claims,
        })
    }

    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Full filtered result set; callers paginate in memory.
    pub async fn search(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        Ok(self.store.search(filter).await?)
    }

    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub async fn update(&self, user: &User) -> Result<User, AppError> {
        self.store.update(user).await.map_err(not_found_as)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store.delete(id).await.map_err(not_found_as)?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
