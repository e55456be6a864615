// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, engine, and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, dead_code)]

//! Shared test utilities for `coachlink`
//!
//! Common setup functions to reduce duplication across integration tests.

use std::env;
use std::sync::Once;

use coachlink::database::Database;
use coachlink::engine::RelationshipEngine;
use coachlink::identity::IdentityService;
use coachlink::models::{AuthIdentity, RegisterRequest, User, UserKind};

static INIT_LOGGER: Once = Once::new();

/// Minimum bcrypt cost keeps credential hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG environment variable controls the test logging level
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database per test
pub async fn test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Relationship engine over a test database
pub fn test_engine(database: &Database) -> RelationshipEngine {
    RelationshipEngine::new(database.clone())
}

/// Identity service over a test database
pub fn test_identity(database: &Database) -> IdentityService {
    IdentityService::new(database.clone(), TEST_BCRYPT_COST)
}

/// Register a coach through the real registration path
pub async fn create_coach(database: &Database, email: &str, name: &str) -> User {
    test_identity(database)
        .register(RegisterRequest {
            email: email.to_owned(),
            password: "strong-password".to_owned(),
            display_name: name.to_owned(),
            phone: None,
            kind: UserKind::Coach,
        })
        .await
        .expect("Failed to register coach")
}

/// Register a trainee through the real registration path
pub async fn create_trainee(database: &Database, email: &str, name: &str) -> User {
    test_identity(database)
        .register(RegisterRequest {
            email: email.to_owned(),
            password: "strong-password".to_owned(),
            display_name: name.to_owned(),
            phone: None,
            kind: UserKind::Trainee,
        })
        .await
        .expect("Failed to register trainee")
}

/// Authenticated identity of a registered user
pub fn identity_of(user: &User) -> AuthIdentity {
    AuthIdentity::of(user)
}
