//! Test assertion helpers - fluent API for verifying HTTP responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    pub fn has_detail(self, expected: &str) -> Self {
        assert_eq!(self.response.body, json!({ "detail": expected }));
        self
    }

    /// The generic 401 every token failure collapses to
    pub fn is_credentials_rejection(self) -> Self {
        assert_eq!(self.response.www_authenticate.as_deref(), Some("Bearer"));
        self.has_status(StatusCode::UNAUTHORIZED)
            .has_detail("Could not validate credentials")
    }

    /// A bearer token pair, returning the access token
    pub fn is_bearer_token(self) -> String {
        let body = &self.response.body;
        assert_eq!(body["token_type"], "Bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub fn todo_titles(self) -> Vec<String> {
        self.response.body["todos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|todo| todo["title"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn body(self) -> &'a Value {
        &self.response.body
    }
}
