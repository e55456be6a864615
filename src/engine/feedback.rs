// ABOUTME: Feedback lifecycle operations: submission, update, deletion
// ABOUTME: Keeps the owning coach's feedback set in step with feedback rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use tracing::{info, warn};
use uuid::Uuid;

use super::RelationshipEngine;
use crate::database::{feedback, users};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AuthIdentity, CreateFeedbackRequest, Feedback, UpdateFeedbackRequest,
};
use crate::permissions::{self, Action};

/// Valid feedback rating range, inclusive
const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

fn check_rating(rating: i32) -> AppResult<()> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "Rating must be between 1 and 5, got {rating}"
        )))
    }
}

impl RelationshipEngine {
    /// Submit feedback for a coach the authenticated trainee is assigned to
    ///
    /// The feedback row and the coach's feedback set are written in one
    /// transaction; a trainee can only rate a coach whose trainee set
    /// already contains them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity is not the trainee named in the request (`PermissionDenied`)
    /// - The coach does not exist (`NotFound`)
    /// - The trainee is not assigned to the coach (`PermissionDenied`)
    /// - The rating or comment fails the defensive shape checks
    /// - A database operation fails
    #[tracing::instrument(skip(self, request), fields(user_id = %identity.user_id))]
    pub async fn submit_feedback(
        &self,
        identity: &AuthIdentity,
        request: CreateFeedbackRequest,
    ) -> AppResult<Feedback> {
        check_rating(request.rating)?;
        if request.comment.trim().is_empty() {
            return Err(AppError::invalid_input("Comment must not be empty"));
        }

        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;
        permissions::require(
            &AuthIdentity::of(&auth_user),
            &Action::SubmitFeedback {
                trainee_id: request.trainee_id,
            },
        )?;

        let mut coach = users::fetch_user_by_id(&mut tx, request.coach_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Coach with ID: {}", request.coach_id)))?;
        let coach_id = coach.id;
        let coach_profile = coach
            .coach_profile_mut()
            .ok_or_else(|| AppError::not_found(format!("Coach with ID: {}", request.coach_id)))?;

        // Feedback requires an established coaching relationship
        if !coach_profile.trainee_ids.contains(&auth_user.id) {
            return Err(AppError::permission_denied(
                "Feedback requires an assignment to this coach",
            ));
        }

        let entry = Feedback {
            id: Uuid::new_v4(),
            rating: request.rating,
            comment: request.comment,
            trainee_id: auth_user.id,
        };
        feedback::insert_feedback(&mut tx, &entry).await?;

        coach_profile.feedback_ids.push(entry.id);
        users::persist_coach_refs(&mut tx, coach_id, coach_profile).await?;

        Self::commit(tx).await?;
        info!(feedback_id = %entry.id, coach_id = %coach_id, "Feedback submitted");
        Ok(entry)
    }

    /// Update rating or comment of a feedback entry the trainee authored
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The feedback does not exist (`NotFound`)
    /// - The identity is not the author (`PermissionDenied`)
    /// - The new rating or comment fails the defensive shape checks
    /// - A database operation fails
    #[tracing::instrument(skip(self, request), fields(user_id = %identity.user_id, feedback_id = %feedback_id))]
    pub async fn update_feedback(
        &self,
        identity: &AuthIdentity,
        feedback_id: Uuid,
        request: UpdateFeedbackRequest,
    ) -> AppResult<Feedback> {
        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;

        let mut entry = feedback::fetch_feedback(&mut tx, feedback_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Feedback with ID: {feedback_id}")))?;
        permissions::require(
            &AuthIdentity::of(&auth_user),
            &Action::ModifyFeedback {
                author_id: entry.trainee_id,
            },
        )?;

        if let Some(rating) = request.rating {
            check_rating(rating)?;
            entry.rating = rating;
        }
        if let Some(comment) = request.comment {
            if comment.trim().is_empty() {
                return Err(AppError::invalid_input("Comment must not be empty"));
            }
            entry.comment = comment;
        }
        feedback::persist_feedback_fields(&mut tx, &entry).await?;

        Self::commit(tx).await?;
        info!(feedback_id = %feedback_id, "Feedback updated");
        Ok(entry)
    }

    /// Delete a feedback entry the trainee authored
    ///
    /// The identifier is also removed from the owning coach's feedback set
    /// in the same transaction. A missing coach record does not block the
    /// deletion; it is logged and the dangling reference simply no longer
    /// exists once the row is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The feedback does not exist (`NotFound`)
    /// - The identity is not the author (`PermissionDenied`)
    /// - A database operation fails
    #[tracing::instrument(skip(self), fields(user_id = %identity.user_id, feedback_id = %feedback_id))]
    pub async fn delete_feedback(
        &self,
        identity: &AuthIdentity,
        feedback_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;

        let entry = feedback::fetch_feedback(&mut tx, feedback_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Feedback with ID: {feedback_id}")))?;
        permissions::require(
            &AuthIdentity::of(&auth_user),
            &Action::ModifyFeedback {
                author_id: entry.trainee_id,
            },
        )?;

        match feedback::fetch_owning_coach(&mut tx, feedback_id).await? {
            Some(mut coach) => {
                let coach_id = coach.id;
                let coach_profile = coach
                    .coach_profile_mut()
                    .ok_or_else(|| AppError::internal("Coach record without coach payload"))?;
                coach_profile.feedback_ids.retain(|id| *id != feedback_id);
                users::persist_coach_refs(&mut tx, coach_id, coach_profile).await?;
            }
            None => {
                warn!(
                    feedback_id = %feedback_id,
                    "No coach references this feedback; deleting the orphaned entry"
                );
            }
        }

        if !feedback::delete_feedback(&mut tx, feedback_id).await? {
            return Err(AppError::not_found(format!(
                "Feedback with ID: {feedback_id}"
            )));
        }

        Self::commit(tx).await?;
        info!(feedback_id = %feedback_id, "Feedback deleted");
        Ok(())
    }
}
