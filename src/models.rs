// ABOUTME: Common data models for users, workout plans, and feedback
// ABOUTME: Defines the coach/trainee tagged union and request DTOs for engine operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminant for the two user kinds
///
/// The kind is fixed at registration and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    /// Owns workout plans and submits feedback
    Trainee,
    /// Creates and manages plans, receives feedback
    Coach,
}

impl UserKind {
    /// Stable string form used in the database kind column
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trainee => "trainee",
            Self::Coach => "coach",
        }
    }
}

/// Relationship state carried by a trainee
///
/// The two plan buckets are mutually exclusive: a plan identifier lives in
/// exactly one of them for as long as the plan record exists, mirroring the
/// plan's `active` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraineeProfile {
    /// Most recently assigned coach, if any
    pub coach_id: Option<Uuid>,
    /// Identifiers of active plans, in assignment order
    pub current_plans: Vec<Uuid>,
    /// Identifiers of deactivated plans, in deactivation order
    pub past_plans: Vec<Uuid>,
}

/// Relationship state and public profile carried by a coach
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachProfile {
    /// Trainees this coach has created plans for (no duplicates)
    pub trainee_ids: Vec<Uuid>,
    /// Feedback entries received, in submission order
    pub feedback_ids: Vec<Uuid>,
    /// Free-form self description
    pub description: Option<String>,
    /// Profile image URL
    pub image_url: Option<String>,
    /// Listed qualifications
    pub qualifications: Vec<String>,
    /// Areas of specialty
    pub specialties: Vec<String>,
}

/// Kind-specific payload of a user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserProfile {
    /// Trainee payload: coach back-reference and the two plan buckets
    Trainee(TraineeProfile),
    /// Coach payload: trainee set, feedback set, and public profile fields
    Coach(CoachProfile),
}

/// A registered user, either a coach or a trainee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Globally unique email address
    pub email: String,
    /// One-way hashed credential, never exposed or logged
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub display_name: String,
    /// Optional contact phone
    pub phone: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Kind-specific relationship payload
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl User {
    /// Create a new user with an empty relationship payload for the kind
    #[must_use]
    pub fn new(
        email: String,
        password_hash: String,
        display_name: String,
        phone: Option<String>,
        kind: UserKind,
    ) -> Self {
        let profile = match kind {
            UserKind::Trainee => UserProfile::Trainee(TraineeProfile::default()),
            UserKind::Coach => UserProfile::Coach(CoachProfile::default()),
        };
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            phone,
            created_at: Utc::now(),
            profile,
        }
    }

    /// Kind discriminant of this user
    #[must_use]
    pub const fn kind(&self) -> UserKind {
        match self.profile {
            UserProfile::Trainee(_) => UserKind::Trainee,
            UserProfile::Coach(_) => UserKind::Coach,
        }
    }

    /// Coach payload, if this user is a coach
    #[must_use]
    pub const fn coach_profile(&self) -> Option<&CoachProfile> {
        match &self.profile {
            UserProfile::Coach(profile) => Some(profile),
            UserProfile::Trainee(_) => None,
        }
    }

    /// Mutable coach payload, if this user is a coach
    pub fn coach_profile_mut(&mut self) -> Option<&mut CoachProfile> {
        match &mut self.profile {
            UserProfile::Coach(profile) => Some(profile),
            UserProfile::Trainee(_) => None,
        }
    }

    /// Trainee payload, if this user is a trainee
    #[must_use]
    pub const fn trainee_profile(&self) -> Option<&TraineeProfile> {
        match &self.profile {
            UserProfile::Trainee(profile) => Some(profile),
            UserProfile::Coach(_) => None,
        }
    }

    /// Mutable trainee payload, if this user is a trainee
    pub fn trainee_profile_mut(&mut self) -> Option<&mut TraineeProfile> {
        match &mut self.profile {
            UserProfile::Trainee(profile) => Some(profile),
            UserProfile::Coach(_) => None,
        }
    }
}

/// Identity resolved by the authentication collaborator
///
/// The engine re-resolves the identifier against the store before acting;
/// the kind here is advisory and never trusted for authorization on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Identifier of the authenticated user
    pub user_id: Uuid,
    /// Kind claimed by the authentication layer
    pub kind: UserKind,
}

impl AuthIdentity {
    /// Identity derived from a freshly loaded user record
    #[must_use]
    pub const fn of(user: &User) -> Self {
        Self {
            user_id: user.id,
            kind: user.kind(),
        }
    }
}

/// A single exercise entry inside a workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    /// Exercise name
    pub exercise: String,
    /// Working load in kilograms
    pub load_kg: Option<f64>,
    /// Rep scheme, free-form (e.g. "3x12")
    pub reps: Option<String>,
    /// Rest between sets, free-form (e.g. "60s")
    pub rest: Option<String>,
    /// Per-exercise note
    pub note: Option<String>,
}

/// A workout plan assigned by a coach to a trainee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier
    pub id: Uuid,
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Ordered exercise entries
    pub exercises: Vec<ExerciseEntry>,
    /// Overall note for the plan
    pub note: Option<String>,
    /// The coach that created the plan
    pub coach_id: Uuid,
    /// The trainee the plan is assigned to
    pub trainee_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Whether the plan sits in the trainee's current bucket
    pub active: bool,
}

/// A rated comment from a trainee about a coach
///
/// The owning coach is not stored here; it is derived from the coach's
/// feedback identifier set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Unique identifier
    pub id: Uuid,
    /// Rating, 1 to 5 inclusive
    pub rating: i32,
    /// Non-empty comment text
    pub comment: String,
    /// The trainee that authored the feedback
    pub trainee_id: Uuid,
}

/// Registration request for a new user
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Email address, must be unused
    pub email: String,
    /// Plaintext password, hashed exactly once before storage
    pub password: String,
    /// Display name
    pub display_name: String,
    /// Optional contact phone
    pub phone: Option<String>,
    /// User kind, immutable after registration
    pub kind: UserKind,
}

/// Plan creation request; coach and trainee are addressed by email
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    /// Email of the coach the plan is attributed to
    pub coach_email: String,
    /// Email of the trainee receiving the plan
    pub trainee_email: String,
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Ordered exercise entries
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    /// Overall note
    pub note: Option<String>,
}

/// Partial plan update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlanRequest {
    /// New plan name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Replacement exercise list
    pub exercises: Option<Vec<ExerciseEntry>>,
    /// New overall note
    pub note: Option<String>,
    /// New active state; a change moves the plan between buckets
    pub active: Option<bool>,
}

/// Feedback submission request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedbackRequest {
    /// The coach receiving the feedback
    pub coach_id: Uuid,
    /// The authoring trainee; must equal the authenticated identity
    pub trainee_id: Uuid,
    /// Rating, 1 to 5 inclusive
    pub rating: i32,
    /// Non-empty comment
    pub comment: String,
}

/// Partial feedback update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeedbackRequest {
    /// New rating, 1 to 5 inclusive
    pub rating: Option<i32>,
    /// New comment
    pub comment: Option<String>,
}

/// Partial coach profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCoachProfileRequest {
    /// New self description
    pub description: Option<String>,
    /// New profile image URL
    pub image_url: Option<String>,
    /// Replacement qualification list
    pub qualifications: Option<Vec<String>>,
    /// Replacement specialty list
    pub specialties: Option<Vec<String>>,
}

/// Resolved plan buckets of a trainee
#[derive(Debug, Clone, Serialize)]
pub struct TraineePlans {
    /// Plans currently assigned
    pub current: Vec<Plan>,
    /// Deactivated plans
    pub past: Vec<Plan>,
}
