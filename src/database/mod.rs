// ABOUTME: Core database management with schema setup for SQLite
// ABOUTME: Owns the connection pool and the per-entity operation modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

/// Feedback storage and coach back-reference lookups
pub mod feedback;
/// Workout plan storage
pub mod plans;
/// User account storage for coaches and trainees
pub mod users;

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Database connection pool handle
///
/// Constructed once at process start and passed explicitly into services;
/// there is no ambient global store state. Cloning is cheap (the pool is
/// internally reference-counted).
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open a database connection pool and run schema setup
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database URL is invalid or malformed
    /// - The connection fails
    /// - Schema setup fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // An in-memory database is private to its connection, so the pool is
        // pinned to a single connection to keep every caller on the same data
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(database_url)
                .await
        } else {
            // Ensure SQLite creates the database file if it doesn't exist
            let connection_options = if database_url.starts_with("sqlite:") {
                format!("{database_url}?mode=rwc")
            } else {
                database_url.to_owned()
            };
            SqlitePoolOptions::new()
                .acquire_timeout(Duration::from_secs(5))
                .connect(&connection_options)
                .await
        }
        .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create all tables if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        info!("Running database schema setup");

        // Denormalized reference lists (plan buckets, trainee and feedback
        // sets) are stored as JSON text columns, one row per entity
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                phone TEXT,
                kind TEXT NOT NULL CHECK (kind IN ('trainee', 'coach')),
                coach_id TEXT,
                current_plans TEXT NOT NULL DEFAULT '[]',
                past_plans TEXT NOT NULL DEFAULT '[]',
                trainee_ids TEXT NOT NULL DEFAULT '[]',
                feedback_ids TEXT NOT NULL DEFAULT '[]',
                description TEXT,
                image_url TEXT,
                qualifications TEXT NOT NULL DEFAULT '[]',
                specialties TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                exercises TEXT NOT NULL DEFAULT '[]',
                note TEXT,
                coach_id TEXT NOT NULL,
                trainee_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plans table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT NOT NULL,
                trainee_id TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create feedback table: {e}")))?;

        info!("Database schema setup completed");
        Ok(())
    }
}
