mod service;
pub mod store;
pub mod validation;

pub use service::*;
pub use store::{StoreError, UserStore};
pub use validation::ValidationError;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

/// User as saved on the JSON store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(alias = "full_name")]
    pub name: String,
    pub email: String,
    #[serde(alias = "phone_number")]
    pub phone: String,
    /// Argon2id PHC string.
    pub password: String,
    pub date_of_birth: NaiveDate,
    /// Whole years at registration time.
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub accept_marketing_emails: bool,
}

/// Validated [`User`] waiting for an identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub age: u32,
    pub username: Option<String>,
    pub gender: Option<Gender>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub accept_marketing_emails: bool,
}

impl NewUser {
    /// Turn into a stored [`User`] with `id`.
    pub fn with_id(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            password: self.password,
            date_of_birth: self.date_of_birth,
            age: self.age,
            username: self.username,
            gender: self.gender,
            country: self.country,
            city: self.city,
            accept_marketing_emails: self.accept_marketing_emails,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Registration payload, as sent by clients.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
pub struct Registration {
    #[serde(alias = "full_name")]
    pub name: String,
    pub email: String,
    #[serde(alias = "phone_number")]
    pub phone: String,
    pub password: String,
    pub date_of_birth: String,
    #[validate(
        length(
            min = 3,
            max = 30,
            message = "Username must be 3 to 30 characters long."
        ),
        custom(
            function = "crate::user::validate_username",
            message = "Username must only contain letters, digits and underscores."
        )
    )]
    pub username: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Country must be 2 to 100 characters long."
    ))]
    pub country: Option<String>,
    #[validate(length(
        min = 2,
        max = 100,
        message = "City must be 2 to 100 characters long."
    ))]
    pub city: Option<String>,
    #[serde(default)]
    pub accept_marketing_emails: bool,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("date_of_birth", &self.date_of_birth)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub(crate) fn validate_username(
    username: &str,
) -> Result<(), validator::ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("username"))
    }
}
