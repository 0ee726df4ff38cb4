//! Every registered user, in insertion order.

use axum::extract::State;

use crate::error::Result;
use crate::router::{Json, UserResponse};
use crate::user::UserService;

pub async fn handler(
    State(users): State<UserService>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = users.list().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
