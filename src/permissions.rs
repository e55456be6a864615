// ABOUTME: Pure authorization guard deriving permitted actions from identity and ownership
// ABOUTME: Single point of truth for the authorization rules of all engine operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{AuthIdentity, UserKind};

/// An action an authenticated identity may attempt
///
/// Ownership-sensitive variants carry the owning identifier so the decision
/// stays a pure function of its inputs; the guard performs no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a workout plan (coach only)
    CreatePlan,
    /// Update plan fields or toggle its active state
    UpdatePlan,
    /// Delete a workout plan (coach only)
    DeletePlan,
    /// Submit feedback authored by the given trainee
    SubmitFeedback {
        /// Trainee the feedback is attributed to
        trainee_id: Uuid,
    },
    /// Update or delete an existing feedback entry
    ModifyFeedback {
        /// Trainee that authored the feedback
        author_id: Uuid,
    },
    /// Update the coach's own public profile (coach only)
    UpdateCoachProfile,
    /// Read a trainee's plan buckets
    ViewTraineePlans {
        /// Trainee whose plans are requested
        trainee_id: Uuid,
    },
}

/// Whether the identity is permitted to perform the action
#[must_use]
pub fn is_permitted(identity: &AuthIdentity, action: &Action) -> bool {
    match *action {
        Action::CreatePlan | Action::DeletePlan | Action::UpdateCoachProfile => {
            identity.kind == UserKind::Coach
        }
        // Any authenticated identity may adjust plan fields
        Action::UpdatePlan => true,
        Action::SubmitFeedback { trainee_id } => {
            identity.kind == UserKind::Trainee && identity.user_id == trainee_id
        }
        Action::ModifyFeedback { author_id } => {
            identity.kind == UserKind::Trainee && identity.user_id == author_id
        }
        // Coaches may inspect any trainee, trainees only themselves
        Action::ViewTraineePlans { trainee_id } => {
            identity.kind == UserKind::Coach || identity.user_id == trainee_id
        }
    }
}

/// Check permission, failing with `PermissionDenied` when refused
///
/// # Errors
///
/// Returns a `PermissionDenied` error when the identity may not perform
/// the action
pub fn require(identity: &AuthIdentity, action: &Action) -> AppResult<()> {
    if is_permitted(identity, action) {
        Ok(())
    } else {
        Err(AppError::permission_denied("Action not permitted"))
    }
}
