use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    security::{self, require_auth},
    shared::AppState,
    todo, user,
};

/// Builds the full HTTP surface over the given state.
/// Routes behind `require_auth` receive an `Extension<CurrentUser>`.
pub fn create_router(state: AppState) -> Router {
    let auth = || middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route("/", get(read_root))
        .route("/auth/token", post(security::login_for_token))
        .route(
            "/auth/refresh_token",
            post(security::refresh_access_token).route_layer(auth()),
        )
        .route("/users", post(user::create_user).get(user::list_users))
        .route(
            "/users/:user_id",
            get(user::get_user).merge(
                put(user::update_user)
                    .delete(user::delete_user)
                    .route_layer(auth()),
            ),
        )
        .route(
            "/todos",
            post(todo::create_todo)
                .get(todo::list_todos)
                .route_layer(auth()),
        )
        .route(
            "/todos/:todo_id",
            patch(todo::patch_todo)
                .delete(todo::delete_todo)
                .route_layer(auth()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Olá Mundo!" }))
}
