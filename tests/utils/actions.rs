#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Status and decoded JSON body of one request
pub struct TestResponse {
    pub status: StatusCode,
    pub www_authenticate: Option<String>,
    pub body: Value,
}

impl TestSetup {
    /// Send a request through the router and decode the body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            www_authenticate,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Send a JSON request, optionally with a bearer token
    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Move the shared clock forward
    pub fn advance_clock(&self, by: Duration) {
        self.clock.advance(by);
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Register an account whose password is `<username>-pw`
    pub async fn register(&self, username: &str) -> TestResponse {
        self.send_json(
            "POST",
            "/users",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@test.com", username),
                "password": format!("{}-pw", username),
            })),
        )
        .await
    }

    /// POST /auth/token as an urlencoded form
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", email, password)))
            .unwrap();
        self.send(request).await
    }

    /// Register then log in, returning the access token
    pub async fn register_and_login(&self, username: &str) -> String {
        let registered = self.register(username).await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let response = self
            .login(&format!("{}@test.com", username), &format!("{}-pw", username))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn refresh(&self, token: &str) -> TestResponse {
        self.send_json("POST", "/auth/refresh_token", Some(token), None)
            .await
    }

    pub async fn create_todo(&self, token: &str, title: &str, state: &str) -> TestResponse {
        self.send_json(
            "POST",
            "/todos",
            Some(token),
            Some(json!({
                "title": title,
                "description": format!("{} description", title),
                "state": state,
            })),
        )
        .await
    }
}
