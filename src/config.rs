// ABOUTME: Environment-based configuration for database and credential hashing
// ABOUTME: ServerConfig::from_env is the single entry point for process configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use std::env;

use crate::errors::{AppError, AppResult};

/// Default database location when `DATABASE_URL` is not set
const DEFAULT_DATABASE_URL: &str = "sqlite:coachlink.db";

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database URL (`DATABASE_URL`)
    pub database_url: String,
    /// bcrypt work factor for credential hashing (`BCRYPT_COST`)
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if `BCRYPT_COST` is set but not a valid cost value
    pub fn from_env() -> AppResult<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|e| AppError::config(format!("Invalid BCRYPT_COST value: {e}")))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        // bcrypt rejects costs outside 4..=31, fail at startup instead
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::config(format!(
                "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
            )));
        }

        Ok(Self {
            database_url,
            bcrypt_cost,
        })
    }
}
