use std::sync::Arc;

use axum::extract::FromRef;

use crate::AppState;
use crate::clock::Clock;
use crate::config::Policy;
use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::user::{Registration, User, UserStore, store, validation};

/// User manager.
///
/// Glue between the [`validation`] rules, password hashing and the
/// [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    pub store: Arc<UserStore>,
    pub pwd: Arc<PasswordManager>,
    pub policy: Arc<Policy>,
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> UserService {
        state.users.clone()
    }
}

impl UserService {
    /// Validate, hash password then store a new user.
    pub async fn register(&self, registration: Registration) -> Result<User> {
        let mut user = validation::validate(
            &registration,
            &self.policy,
            self.clock.today(),
        )?;
        user.password = self.pwd.hash_password(&user.password)?;

        let user = self
            .store
            .modify(|users| {
                validation::ensure_unique_email(users, &user.email)?;
                Ok::<_, ServerError>(store::push_next(users, user))
            })
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        metrics::counter!("users_created_total").increment(1);

        Ok(user)
    }

    /// Every registered user.
    pub async fn list(&self) -> Result<Vec<User>> {
        Ok(self.store.list().await?)
    }

    /// Find user `id`.
    pub async fn find(&self, id: u64) -> Result<User> {
        self.store
            .find(id)
            .await?
            .ok_or(ServerError::NotFound { id })
    }

    /// Delete user `id`.
    pub async fn delete(&self, id: u64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(ServerError::NotFound { id });
        }

        tracing::info!(user_id = id, "user deleted");
        metrics::counter!("users_deleted_total").increment(1);

        Ok(())
    }
}
