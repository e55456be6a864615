// ABOUTME: Identity store service for registration and credential management
// ABOUTME: Hashes credentials exactly once per change and never exposes stored hashes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use tracing::info;

use crate::auth;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{RegisterRequest, User};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 8;

/// Registration and credential operations over the user store
///
/// Field-shape validation happens upstream; the checks here are defensive
/// guards against malformed input reaching the store.
#[derive(Clone)]
pub struct IdentityService {
    database: Database,
    bcrypt_cost: u32,
}

impl IdentityService {
    /// Create the service over an open database handle
    #[must_use]
    pub const fn new(database: Database, bcrypt_cost: u32) -> Self {
        Self {
            database,
            bcrypt_cost,
        }
    }

    /// Register a new user
    ///
    /// The plaintext credential is hashed exactly once, here, before any
    /// record is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email or password fails the defensive shape checks
    /// - The email is already registered (`DuplicateEmail`)
    /// - The database operation fails
    #[tracing::instrument(skip(self, request), fields(kind = ?request.kind))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if !request.email.contains('@') {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if request.display_name.trim().is_empty() {
            return Err(AppError::invalid_input("Display name must not be empty"));
        }

        let password_hash = auth::hash_password(&request.password, self.bcrypt_cost)?;
        let user = User::new(
            request.email,
            password_hash,
            request.display_name,
            request.phone,
            request.kind,
        );

        self.database.create_user(&user).await?;
        info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    /// Verify a plaintext credential against a user's stored hash
    ///
    /// # Errors
    ///
    /// Returns an error if the verification itself fails; a wrong password
    /// is `Ok(false)`, not an error
    pub async fn verify_credential(&self, user: &User, password: &str) -> AppResult<bool> {
        auth::verify_password(password, &user.password_hash).await
    }

    /// Resolve an email/password pair to a user record
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` when the email is unknown or the password does
    /// not match; the two cases are indistinguishable in the error
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .database
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if self.verify_credential(&user, password).await? {
            Ok(user)
        } else {
            Err(AppError::auth_invalid("Invalid email or password"))
        }
    }

    /// Change a user's password
    ///
    /// Re-hashes because the credential field itself changes; no other
    /// update path touches the hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the password fails the shape check, the user is
    /// not found, or the database operation fails
    pub async fn change_password(&self, user: &User, new_password: &str) -> AppResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password_hash = auth::hash_password(new_password, self.bcrypt_cost)?;
        self.database
            .update_user_password(user.id, &password_hash)
            .await?;
        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Search coaches by display name or email substring
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search_coaches(&self, query: &str) -> AppResult<Vec<User>> {
        self.database.search_coaches(query).await
    }
}
