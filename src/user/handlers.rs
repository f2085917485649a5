use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{ListUsersQuery, UserList, UserPublic, UserSchema},
};
use crate::{
    security::CurrentUser,
    shared::{AppError, AppState},
};

fn user_service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.todo_repository),
        Arc::clone(&state.auth_service),
    )
}

/// HTTP handler for registering a user
///
/// POST /users
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserSchema>,
) -> Result<(StatusCode, Json<UserPublic>), AppError> {
    let user = user_service(&state).register(request).await?;

    info!(user_id = user.id, "User created successfully");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users?skip=&limit=
#[instrument(name = "list_users", skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserList>, AppError> {
    let users = user_service(&state)
        .list_users(query.skip, query.limit)
        .await?;

    Ok(Json(users))
}

/// GET /users/{user_id}
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserPublic>, AppError> {
    Ok(Json(user_service(&state).get_user(user_id).await?))
}

/// PUT /users/{user_id}
#[instrument(name = "update_user", skip(state, current_user, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<UserSchema>,
) -> Result<Json<UserPublic>, AppError> {
    let user = user_service(&state)
        .update_user(current_user, user_id, request)
        .await?;

    Ok(Json(user))
}

/// DELETE /users/{user_id}
#[instrument(name = "delete_user", skip(state, current_user))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<UserPublic>, AppError> {
    let user = user_service(&state)
        .delete_user(current_user, user_id)
        .await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{body::Body, http::Request, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        create_router(AppStateBuilder::new().build())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn register(app: &Router, username: &str) -> Value {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/users",
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret",
                }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn login(app: &Router, username: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}%40example.com&password=secret",
                username
            )))
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_user() {
        let app = app();
        let body = register(&app, "alice").await;

        assert_eq!(
            body,
            json!({"id": 1, "username": "alice", "email": "alice@example.com"})
        );
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let app = app();
        register(&app, "alice").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/users",
                json!({"username": "alice", "email": "new@example.com", "password": "x"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Username already exists"}));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let app = app();
        register(&app, "alice").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/users",
                json!({"username": "other", "email": "alice@example.com", "password": "x"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Email already exists"}));
    }

    #[tokio::test]
    async fn test_list_users_with_pagination() {
        let app = app();
        for name in ["a", "b", "c"] {
            register(&app, name).await;
        }

        let request = Request::builder()
            .uri("/users")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 3);

        let request = Request::builder()
            .uri("/users?skip=1&limit=1")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, request).await;
        assert_eq!(
            body,
            json!({"users": [{"id": 2, "username": "b", "email": "b@example.com"}]})
        );
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let app = app();
        let request = Request::builder()
            .uri("/users/666")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "User not found"}));
    }

    #[tokio::test]
    async fn test_update_user() {
        let app = app();
        register(&app, "alice").await;
        let token = login(&app, "alice").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                "/users/1",
                json!({"username": "bob", "email": "bob@example.com", "password": "mynewpassword"}),
                Some(&token),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"id": 1, "username": "bob", "email": "bob@example.com"})
        );
    }

    #[tokio::test]
    async fn test_update_other_user_is_forbidden() {
        let app = app();
        register(&app, "alice").await;
        register(&app, "mallory").await;
        let token = login(&app, "mallory").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                "/users/1",
                json!({"username": "x", "email": "x@example.com", "password": "x"}),
                Some(&token),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": "Not enough permission"}));
    }

    #[tokio::test]
    async fn test_update_into_taken_username_conflicts() {
        let app = app();
        register(&app, "alice").await;
        register(&app, "bob").await;
        let token = login(&app, "bob").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                "/users/2",
                json!({"username": "alice", "email": "bob@example.com", "password": "x"}),
                Some(&token),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"detail": "Username or Email already exists"}));
    }

    #[tokio::test]
    async fn test_update_without_token_is_unauthorized() {
        let app = app();
        register(&app, "alice").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                "/users/1",
                json!({"username": "x", "email": "x@example.com", "password": "x"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Not authenticated"}));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let app = app();
        register(&app, "alice").await;
        let token = login(&app, "alice").await;

        let request = Request::builder()
            .method("DELETE")
            .uri("/users/1")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        // The token now names a subject that no longer exists
        let request = Request::builder()
            .method("DELETE")
            .uri("/users/1")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Could not validate credentials"}));
    }

    #[tokio::test]
    async fn test_delete_other_user_is_forbidden() {
        let app = app();
        register(&app, "alice").await;
        register(&app, "mallory").await;
        let token = login(&app, "mallory").await;

        let request = Request::builder()
            .method("DELETE")
            .uri("/users/1")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": "Not enough permission"}));
    }
}
