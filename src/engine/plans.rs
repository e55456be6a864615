// ABOUTME: Plan lifecycle operations: creation, field updates, activation toggles, deletion
// ABOUTME: Maintains trainee plan buckets and coach trainee sets atomically with plan rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::RelationshipEngine;
use crate::database::{plans, users};
use crate::errors::{AppError, AppResult};
use crate::models::{AuthIdentity, CreatePlanRequest, Plan, UpdatePlanRequest, UserProfile};
use crate::permissions::{self, Action};

impl RelationshipEngine {
    /// Create a plan and link all three participants in one transaction
    ///
    /// On success the plan is in the trainee's current bucket, the trainee
    /// is in the coach's trainee set, and the trainee's coach back-reference
    /// points at the coach. Any step failure rolls the whole operation back.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity does not resolve to a coach (`PermissionDenied`)
    /// - The trainee or coach email is unknown (`NotFound`)
    /// - A database operation fails
    #[tracing::instrument(skip(self, request), fields(user_id = %identity.user_id))]
    pub async fn create_plan(
        &self,
        identity: &AuthIdentity,
        request: CreatePlanRequest,
    ) -> AppResult<Plan> {
        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;
        permissions::require(&AuthIdentity::of(&auth_user), &Action::CreatePlan)?;

        let mut trainee = users::fetch_user_by_email(&mut tx, &request.trainee_email)
            .await?
            .filter(|user| matches!(user.profile, UserProfile::Trainee(_)))
            .ok_or_else(|| {
                AppError::not_found(format!("Trainee with email: {}", request.trainee_email))
            })?;

        let mut coach = users::fetch_user_by_email(&mut tx, &request.coach_email)
            .await?
            .filter(|user| matches!(user.profile, UserProfile::Coach(_)))
            .ok_or_else(|| {
                AppError::not_found(format!("Coach with email: {}", request.coach_email))
            })?;

        // The coach reference comes from the request body and may differ
        // from the authenticated coach; allowed, but worth noticing
        if coach.id != auth_user.id {
            warn!(
                authenticated = %auth_user.id,
                referenced = %coach.id,
                "Plan attributed to a coach other than the authenticated one"
            );
        }

        let coach_id = coach.id;
        let trainee_id = trainee.id;

        {
            let coach_profile = coach
                .coach_profile_mut()
                .ok_or_else(|| AppError::internal("Coach record without coach payload"))?;
            if !coach_profile.trainee_ids.contains(&trainee_id) {
                coach_profile.trainee_ids.push(trainee_id);
                users::persist_coach_refs(&mut tx, coach_id, coach_profile).await?;
            }
        }

        let plan = Plan {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            exercises: request.exercises,
            note: request.note,
            coach_id,
            trainee_id,
            created_at: Utc::now(),
            active: true,
        };
        plans::insert_plan(&mut tx, &plan).await?;

        {
            let trainee_profile = trainee
                .trainee_profile_mut()
                .ok_or_else(|| AppError::internal("Trainee record without trainee payload"))?;
            trainee_profile.current_plans.push(plan.id);
            trainee_profile.coach_id = Some(coach_id);
            users::persist_trainee_refs(&mut tx, trainee_id, trainee_profile).await?;
        }

        Self::commit(tx).await?;
        info!(plan_id = %plan.id, coach_id = %coach_id, trainee_id = %trainee_id, "Plan created");
        Ok(plan)
    }

    /// Apply a partial update to a plan, moving it between buckets when the
    /// active state changes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The plan does not exist (`NotFound`)
    /// - The plan's trainee no longer exists while toggling (`NotFound`)
    /// - The identifier is missing from the expected bucket (`Conflict`)
    /// - A database operation fails
    #[tracing::instrument(skip(self, request), fields(user_id = %identity.user_id, plan_id = %plan_id))]
    pub async fn update_plan(
        &self,
        identity: &AuthIdentity,
        plan_id: Uuid,
        request: UpdatePlanRequest,
    ) -> AppResult<Plan> {
        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;
        permissions::require(&AuthIdentity::of(&auth_user), &Action::UpdatePlan)?;

        let stored = plans::fetch_plan(&mut tx, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan with ID: {plan_id}")))?;

        let mut updated = stored.clone();
        if let Some(name) = request.name {
            updated.name = name;
        }
        if let Some(description) = request.description {
            updated.description = Some(description);
        }
        if let Some(exercises) = request.exercises {
            updated.exercises = exercises;
        }
        if let Some(note) = request.note {
            updated.note = Some(note);
        }
        if let Some(active) = request.active {
            updated.active = active;
        }
        plans::persist_plan_fields(&mut tx, &updated).await?;

        // A changed active flag moves the identifier between the trainee's
        // buckets in the same transaction
        if updated.active != stored.active {
            let mut trainee = users::fetch_user_by_id(&mut tx, stored.trainee_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Trainee with ID: {}", stored.trainee_id))
                })?;
            let trainee_profile = trainee
                .trainee_profile_mut()
                .ok_or_else(|| AppError::internal("Trainee record without trainee payload"))?;

            {
                let source = if stored.active {
                    &mut trainee_profile.current_plans
                } else {
                    &mut trainee_profile.past_plans
                };
                let index = source.iter().position(|id| *id == plan_id).ok_or_else(|| {
                    AppError::conflict(format!(
                        "Plan {plan_id} missing from the trainee's expected bucket"
                    ))
                })?;
                source.remove(index);
            }
            let target = if updated.active {
                &mut trainee_profile.current_plans
            } else {
                &mut trainee_profile.past_plans
            };
            target.push(plan_id);

            users::persist_trainee_refs(&mut tx, stored.trainee_id, trainee_profile).await?;
        }

        Self::commit(tx).await?;
        info!(plan_id = %plan_id, active = updated.active, "Plan updated");
        Ok(updated)
    }

    /// Delete a plan and scrub it from its trainee's buckets
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity does not resolve to a coach (`PermissionDenied`)
    /// - The plan does not exist (`NotFound`)
    /// - A database operation fails
    #[tracing::instrument(skip(self), fields(user_id = %identity.user_id, plan_id = %plan_id))]
    pub async fn delete_plan(&self, identity: &AuthIdentity, plan_id: Uuid) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let auth_user = Self::resolve_identity(&mut tx, identity).await?;
        permissions::require(&AuthIdentity::of(&auth_user), &Action::DeletePlan)?;

        let plan = plans::fetch_plan(&mut tx, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan with ID: {plan_id}")))?;

        if !plans::delete_plan(&mut tx, plan_id).await? {
            return Err(AppError::not_found(format!("Plan with ID: {plan_id}")));
        }

        // Exactly one bucket holds the identifier, but removal scrubs
        // both so a corrupted record cannot survive deletion
        match users::fetch_user_by_id(&mut tx, plan.trainee_id).await? {
            Some(mut trainee) => {
                let trainee_profile = trainee
                    .trainee_profile_mut()
                    .ok_or_else(|| AppError::internal("Trainee record without trainee payload"))?;
                trainee_profile.current_plans.retain(|id| *id != plan_id);
                trainee_profile.past_plans.retain(|id| *id != plan_id);
                users::persist_trainee_refs(&mut tx, plan.trainee_id, trainee_profile).await?;
            }
            None => {
                warn!(
                    trainee_id = %plan.trainee_id,
                    "Plan trainee no longer exists; skipping bucket cleanup"
                );
            }
        }

        Self::commit(tx).await?;
        info!(plan_id = %plan_id, "Plan deleted");
        Ok(())
    }
}
