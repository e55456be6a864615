// ABOUTME: Credential hashing and verification built on bcrypt
// ABOUTME: Hashing is one-way and salted; plaintext and hashes are never logged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use tokio::task;

use crate::errors::{AppError, AppResult};

/// Hash a plaintext credential with bcrypt
///
/// Called exactly once per credential change; unrelated profile updates
/// never re-hash.
///
/// # Errors
///
/// Returns an error if bcrypt rejects the cost or the input
pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext credential against a stored hash
///
/// bcrypt verification is CPU-bound, so it runs on the blocking thread pool
/// to avoid stalling the async executor.
///
/// # Errors
///
/// Returns an error if the blocking task fails or the stored hash is malformed
pub async fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();

    task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
}
