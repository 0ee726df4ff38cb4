//! Error handler for enroll.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::user::{StoreError, ValidationError};

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("no user with id {id}")]
    NotFound { id: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseError {
    pub r#type: Option<String>,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: Option<String>,
    pub errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `type` field with the error kind.
    pub fn kind(mut self, kind: &str) -> Self {
        self.r#type = Some(kind.into());
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Point at the offending field.
    pub fn field(mut self, error: &ValidationError) -> Self {
        self.errors = Some(vec![FieldError {
            field: error.field().to_owned(),
            message: error.to_string(),
        }]);
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(err @ ValidationError::DuplicateEmail) => {
                response
                    .kind(err.kind())
                    .field(err)
                    .status(StatusCode::CONFLICT)
            },

            ServerError::Validation(err) => response.kind(err.kind()).field(err),

            ServerError::Axum(rejection) => response
                .kind("InvalidBody")
                .title("Request body could not be parsed.")
                .details(&rejection.body_text())
                .status(rejection.status()),

            ServerError::Path(rejection) => response
                .kind("InvalidPath")
                .title("Request path is not valid.")
                .details(&rejection.body_text())
                .status(StatusCode::BAD_REQUEST),

            ServerError::NotFound { .. } => response
                .kind("NotFound")
                .title("User not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Store(err @ StoreError::CorruptStore { .. }) => {
                tracing::error!(error = %err, "server returned 500 status");

                ResponseError::default()
                    .kind("CorruptStore")
                    .details("Stored users cannot be read.")
            },

            ServerError::Store(_) | ServerError::Crypto(_) => {
                tracing::error!(error = %self, "server returned 500 status");

                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::user::validation::PasswordIssue;

    async fn render(err: ServerError) -> (StatusCode, ResponseError) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_response() {
        let (status, body) = render(
            ValidationError::WeakPassword(PasswordIssue::MissingDigit).into(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, 400);
        assert_eq!(body.r#type.as_deref(), Some("WeakPassword"));
        let errors = body.errors.unwrap();
        assert_eq!(errors[0].field, "password");
        assert_eq!(errors[0].message, "password is too weak, it must contain a digit");
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let (status, body) =
            render(ValidationError::DuplicateEmail.into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.r#type.as_deref(), Some("DuplicateEmail"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = render(ServerError::NotFound { id: 7 }).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.detail, "no user with id 7");
        assert!(body.errors.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_store_hides_details() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let (status, body) = render(
            StoreError::CorruptStore {
                path: "/secret/users_db.json".into(),
                source,
            }
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.r#type.as_deref(), Some("CorruptStore"));
        assert!(!body.detail.contains("/secret"));
    }
}
