//! Delete user from the store.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::router::Path;
use crate::user::UserService;

pub async fn handler(
    State(users): State<UserService>,
    Path(user_id): Path<u64>,
) -> Result<StatusCode> {
    users.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    use crate::error::ResponseError;
    use crate::user::store::tests::new_user;
    use crate::*;

    #[tokio::test]
    async fn test_delete_handler() {
        let dir = TempDir::new().unwrap();
        let state = router::tests::state(&dir);
        let app = app(state.clone());
        state.users.store.append(new_user("a@gmail.com")).await.unwrap();
        state.users.store.append(new_user("b@gmail.com")).await.unwrap();

        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/users/1",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let users = state.users.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, 2);

        // Deleted user must be gone.
        let response =
            make_request(app, Method::DELETE, "/users/1", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.r#type.as_deref(), Some("NotFound"));

        assert_eq!(state.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_invalid_id() {
        let dir = TempDir::new().unwrap();
        let state = router::tests::state(&dir);
        let app = app(state.clone());
        state.users.store.append(new_user("a@gmail.com")).await.unwrap();

        for path in ["/users/abc", "/users/99999999999999999999999"] {
            let response = make_request(
                app.clone(),
                Method::DELETE,
                path,
                String::default(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers()[axum::http::header::CONTENT_TYPE],
                "application/json"
            );

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: ResponseError = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.r#type.as_deref(), Some("InvalidPath"));
            assert_eq!(body.status, 400);
        }

        assert_eq!(state.users.list().await.unwrap().len(), 1);
    }
}
