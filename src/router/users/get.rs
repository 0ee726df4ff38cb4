use axum::extract::State;

use crate::error::Result;
use crate::router::{Json, Path, UserResponse};
use crate::user::UserService;

pub async fn handler(
    State(users): State<UserService>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserResponse>> {
    Ok(Json(users.find(user_id).await?.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    use super::*;
    use crate::user::store::tests::new_user;
    use crate::*;

    #[tokio::test]
    async fn test_get_user_handler() {
        let dir = TempDir::new().unwrap();
        let state = router::tests::state(&dir);
        let app = app(state.clone());
        state.users.store.append(new_user("a@gmail.com")).await.unwrap();

        let response =
            make_request(app.clone(), Method::GET, "/users/1", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: UserResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.id, 1);
        assert_eq!(body.email, "a@gmail.com");

        let response =
            make_request(app, Method::GET, "/users/2", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_user_with_invalid_id() {
        let dir = TempDir::new().unwrap();
        let app = app(router::tests::state(&dir));

        let response =
            make_request(app, Method::GET, "/users/abc", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: crate::error::ResponseError =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(body.r#type.as_deref(), Some("InvalidPath"));
    }
}
