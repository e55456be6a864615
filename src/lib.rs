// ABOUTME: Main library entry point for the Coachlink coaching platform core
// ABOUTME: Exposes the relationship engine, identity services, and persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

#![deny(unsafe_code)]

//! # Coachlink Core
//!
//! Transactional relationship-consistency engine for a fitness coaching
//! service. Coaches and trainees keep denormalized back-references to each
//! other (a coach lists its trainees and received feedback, a trainee lists
//! its current and past workout plans), and every mutating operation updates
//! all affected sides of a relationship inside a single database transaction.
//!
//! ## Architecture
//!
//! - **`models`**: Users (coach/trainee tagged union), plans, feedback
//! - **`database`**: SQLite persistence with per-entity operation modules
//! - **`engine`**: The relationship engine - plan and feedback lifecycle
//! - **`identity`**: Registration, credential verification, password changes
//! - **`permissions`**: Pure authorization guard consulted by the engine
//!
//! Transport concerns (HTTP routing, token issuance, input-shape validation)
//! live outside this crate; callers hand the engine an already-authenticated
//! identity and map the typed error codes to their own response format.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use coachlink::config::ServerConfig;
//! use coachlink::database::Database;
//! use coachlink::engine::RelationshipEngine;
//! use coachlink::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database_url).await?;
//!     let _engine = RelationshipEngine::new(database);
//!     Ok(())
//! }
//! ```

/// Credential hashing and verification
pub mod auth;

/// Configuration management from environment variables
pub mod config;

/// SQLite persistence layer for users, plans, and feedback
pub mod database;

/// Relationship engine - transactional plan and feedback operations
pub mod engine;

/// Unified error handling system with typed error codes
pub mod errors;

/// Identity store service for registration and credential management
pub mod identity;

/// Common data models for users, plans, and feedback
pub mod models;

/// Pure authorization guard derived from identity kind and ownership
pub mod permissions;
