use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::router::{Json, UserResponse};
use crate::user::{Registration, UserService};

/// Handler to create user.
pub async fn handler(
    State(users): State<UserService>,
    Json(body): Json<Registration>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = users.register(body).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::error::ResponseError;
    use crate::*;

    fn body() -> serde_json::Value {
        json!({
            "name": "A",
            "email": "a@gmail.com",
            "phone": "+12345678901",
            "password": "Abc123!@",
            "date_of_birth": "2000-01-01",
        })
    }

    #[tokio::test]
    async fn test_create_handler() {
        let dir = TempDir::new().unwrap();
        let app = app(router::tests::state(&dir));

        let response =
            make_request(app, Method::POST, "/users", body().to_string())
                .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(raw.get("password").is_none());

        let user: UserResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.age, 25);
        assert_eq!(user.email, "a@gmail.com");
    }

    #[tokio::test]
    async fn test_create_accepts_field_aliases() {
        let dir = TempDir::new().unwrap();
        let app = app(router::tests::state(&dir));

        let req_body = json!({
            "full_name": "Grace Hopper",
            "email": "grace@hotmail.com",
            "phone_number": "6123456789",
            "password": "Abc123!@",
            "date_of_birth": "1990-12-31",
            "gender": "female",
            "country": "US",
        });
        let response =
            make_request(app, Method::POST, "/users", req_body.to_string())
                .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let user: UserResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.name, "Grace Hopper");
        assert_eq!(user.phone, "6123456789");
        assert_eq!(user.age, 34);
    }

    #[tokio::test]
    async fn test_create_with_weak_password() {
        let dir = TempDir::new().unwrap();
        let state = router::tests::state(&dir);
        let app = app(state.clone());

        let mut req_body = body();
        req_body["password"] = json!("abc123!@");
        let response =
            make_request(app, Method::POST, "/users", req_body.to_string())
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.r#type.as_deref(), Some("WeakPassword"));
        assert_eq!(body.errors.unwrap()[0].field, "password");

        assert!(state.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_twice() {
        let dir = TempDir::new().unwrap();
        let app = app(router::tests::state(&dir));

        let first =
            make_request(app.clone(), Method::POST, "/users", body().to_string())
                .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second =
            make_request(app, Method::POST, "/users", body().to_string())
                .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let body = second.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.r#type.as_deref(), Some("DuplicateEmail"));
    }

    #[tokio::test]
    async fn test_create_with_broken_json() {
        let dir = TempDir::new().unwrap();
        let app = app(router::tests::state(&dir));

        let response =
            make_request(app, Method::POST, "/users", "{\"name\":".into())
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.r#type.as_deref(), Some("InvalidBody"));
    }
}
