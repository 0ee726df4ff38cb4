//! HTTP API.
pub mod create;
pub mod status;
pub mod users;

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ServerError;
use crate::user::{Gender, User};

/// [`axum::Json`] rejecting with [`ServerError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Json<T>(pub T);

/// [`axum::extract::Path`] rejecting with [`ServerError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct Path<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Public representation of a [`User`], without its password.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub accept_marketing_emails: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            date_of_birth: user.date_of_birth,
            age: user.age,
            username: user.username,
            gender: user.gender,
            country: user.country,
            city: user.city,
            accept_marketing_emails: user.accept_marketing_emails,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::clock::FixedClock;
    use crate::config::Configuration;
    use crate::user::{UserService, UserStore};
    use crate::*;

    /// State writing to `dir`, with 2025-01-01 as today.
    pub(crate) fn state(dir: &TempDir) -> AppState {
        let config = Configuration::default();
        AppState {
            users: UserService {
                store: Arc::new(UserStore::new(
                    dir.path().join("users_db.json"),
                )),
                pwd: Arc::new(crate::crypto::test_manager()),
                policy: Arc::new(config.policy.clone()),
                clock: Arc::new(FixedClock(
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                )),
            },
            config: Arc::new(config),
            metrics: None,
        }
    }
}
