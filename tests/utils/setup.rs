#![allow(dead_code)] // Test utilities may not all be used in every test

use argon2::Params;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::Algorithm;
use std::sync::Arc;

use fast_zero::{
    create_router, AppState, CredentialVerifier, FixedClock, InMemoryTodoRepository,
    InMemoryUserRepository, TokenService, TokenSettings,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-secret";

pub struct TestSetup {
    pub router: Router,
    pub clock: Arc<FixedClock>,
    pub users: Arc<InMemoryUserRepository>,
    pub todos: Arc<InMemoryTodoRepository>,
    pub token_service: Arc<TokenService>,
}

pub struct TestSetupBuilder {
    start: DateTime<Utc>,
    ttl_minutes: i64,
    algorithm: Algorithm,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 7, 23, 22, 0, 0).unwrap(),
            ttl_minutes: 30,
            algorithm: Algorithm::HS256,
        }
    }

    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn build(self) -> TestSetup {
        let clock = Arc::new(FixedClock::new(self.start));
        let users = Arc::new(InMemoryUserRepository::new());
        let todos = Arc::new(InMemoryTodoRepository::new());
        let token_service = Arc::new(TokenService::new(
            TokenSettings::new(TEST_SECRET, self.algorithm, Duration::minutes(self.ttl_minutes)),
            clock.clone(),
        ));

        // Minimal Argon2 cost keeps registration and login fast
        let verifier = CredentialVerifier::with_params(Params::new(1024, 1, 1, None).unwrap());

        let state = AppState::new(
            users.clone(),
            todos.clone(),
            token_service.clone(),
            Arc::new(verifier),
        );

        TestSetup {
            router: create_router(state),
            clock,
            users,
            todos,
            token_service,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
