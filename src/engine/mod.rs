// ABOUTME: Relationship engine orchestrating transactional multi-record mutations
// ABOUTME: Every mutating operation runs authorization plus all writes in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

/// Feedback submission, update, and deletion
mod feedback;
/// Plan creation, update, activation toggling, and deletion
mod plans;

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::database::{users, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AuthIdentity, Feedback, TraineePlans, UpdateCoachProfileRequest, User,
};
use crate::permissions::{self, Action};

/// Orchestrator for all relationship-changing operations
///
/// Holds no cross-request state beyond the database handle, so it is safe
/// for unbounded concurrent use; conflicting writers are serialized by the
/// store's transaction isolation.
#[derive(Clone)]
pub struct RelationshipEngine {
    database: Database,
}

impl RelationshipEngine {
    /// Create the engine over an open database handle
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Begin a transaction; dropping it uncommitted rolls everything back
    pub(crate) async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.database
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    /// Commit a transaction
    pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
    }

    /// Resolve the authenticated identity to its stored user record
    ///
    /// The caller-supplied kind is never trusted; authorization decisions
    /// use the kind of the record loaded here, inside the same transaction
    /// as the writes it gates.
    pub(crate) async fn resolve_identity(
        conn: &mut SqliteConnection,
        identity: &AuthIdentity,
    ) -> AppResult<User> {
        users::fetch_user_by_id(conn, identity.user_id)
            .await?
            .ok_or_else(|| {
                AppError::permission_denied("Authenticated identity does not resolve to a user")
            })
    }

    /// Update the authenticated coach's public profile fields
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity does not resolve to a coach (`PermissionDenied`)
    /// - The database operation fails
    #[tracing::instrument(skip(self, request), fields(user_id = %identity.user_id))]
    pub async fn update_coach_profile(
        &self,
        identity: &AuthIdentity,
        request: UpdateCoachProfileRequest,
    ) -> AppResult<User> {
        let mut tx = self.begin().await?;

        let mut coach = Self::resolve_identity(&mut tx, identity).await?;
        permissions::require(&AuthIdentity::of(&coach), &Action::UpdateCoachProfile)?;
        let coach_id = coach.id;

        {
            let profile = coach
                .coach_profile_mut()
                .ok_or_else(|| AppError::internal("Coach record without coach payload"))?;
            if let Some(description) = request.description {
                profile.description = Some(description);
            }
            if let Some(image_url) = request.image_url {
                profile.image_url = Some(image_url);
            }
            if let Some(qualifications) = request.qualifications {
                profile.qualifications = qualifications;
            }
            if let Some(specialties) = request.specialties {
                profile.specialties = specialties;
            }
            users::persist_coach_public_profile(&mut tx, coach_id, profile).await?;
        }

        Self::commit(tx).await?;
        info!(coach_id = %coach_id, "Coach profile updated");
        Ok(coach)
    }

    /// Resolve a trainee's plan buckets to full plan records
    ///
    /// Read-only: coaches may inspect any trainee, trainees only themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is not permitted or the trainee does
    /// not exist
    pub async fn trainee_plans(
        &self,
        identity: &AuthIdentity,
        trainee_id: Uuid,
    ) -> AppResult<TraineePlans> {
        let auth_user = self
            .database
            .get_user(identity.user_id)
            .await?
            .ok_or_else(|| {
                AppError::permission_denied("Authenticated identity does not resolve to a user")
            })?;
        permissions::require(
            &AuthIdentity::of(&auth_user),
            &Action::ViewTraineePlans { trainee_id },
        )?;

        let trainee = self
            .database
            .get_user(trainee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainee with ID: {trainee_id}")))?;
        let profile = trainee
            .trainee_profile()
            .ok_or_else(|| AppError::not_found(format!("Trainee with ID: {trainee_id}")))?;

        Ok(TraineePlans {
            current: self.database.get_plans_by_ids(&profile.current_plans).await?,
            past: self.database.get_plans_by_ids(&profile.past_plans).await?,
        })
    }

    /// Resolve a coach's received feedback entries
    ///
    /// Public read, so prospective trainees can evaluate a coach.
    ///
    /// # Errors
    ///
    /// Returns an error if the coach does not exist or a query fails
    pub async fn coach_feedbacks(&self, coach_id: Uuid) -> AppResult<Vec<Feedback>> {
        let coach = self
            .database
            .get_user(coach_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Coach with ID: {coach_id}")))?;
        let profile = coach
            .coach_profile()
            .ok_or_else(|| AppError::not_found(format!("Coach with ID: {coach_id}")))?;

        self.database.get_feedback_by_ids(&profile.feedback_ids).await
    }
}
