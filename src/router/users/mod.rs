//! Users-related HTTP API.
mod delete;
mod get;
pub mod list;

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /users` goes to `create`, `GET /users` to `list`.
        .route(
            "/",
            get(list::handler).post(crate::router::create::handler),
        )
        // `GET /users/{id}` goes to `get`, `DELETE` to `delete`.
        .route("/{user_id}", get(get::handler).delete(delete::handler))
}
