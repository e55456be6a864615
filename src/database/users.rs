// ABOUTME: User account database operations for coaches and trainees
// ABOUTME: Handles row mapping of the kind tagged union and relationship column writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{CoachProfile, TraineeProfile, User, UserProfile};

/// Convert a database row to a `User`, dispatching on the kind column
pub(crate) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let email: String = row.get("email");
    let display_name: String = row.get("display_name");
    let password_hash: String = row.get("password_hash");
    let phone: Option<String> = row.get("phone");
    let kind: String = row.get("kind");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    let profile = match kind.as_str() {
        "trainee" => {
            let coach_id: Option<String> = row.get("coach_id");
            let current_plans: String = row.get("current_plans");
            let past_plans: String = row.get("past_plans");
            UserProfile::Trainee(TraineeProfile {
                coach_id: coach_id
                    .map(|raw| parse_uuid(&raw, "users.coach_id"))
                    .transpose()?,
                current_plans: serde_json::from_str(&current_plans)?,
                past_plans: serde_json::from_str(&past_plans)?,
            })
        }
        "coach" => {
            let trainee_ids: String = row.get("trainee_ids");
            let feedback_ids: String = row.get("feedback_ids");
            let qualifications: String = row.get("qualifications");
            let specialties: String = row.get("specialties");
            UserProfile::Coach(CoachProfile {
                trainee_ids: serde_json::from_str(&trainee_ids)?,
                feedback_ids: serde_json::from_str(&feedback_ids)?,
                description: row.get("description"),
                image_url: row.get("image_url"),
                qualifications: serde_json::from_str(&qualifications)?,
                specialties: serde_json::from_str(&specialties)?,
            })
        }
        other => {
            return Err(AppError::internal(format!(
                "Unknown user kind in database: {other}"
            )))
        }
    };

    Ok(User {
        id: parse_uuid(&id, "users.id")?,
        email,
        password_hash,
        display_name,
        phone,
        created_at,
        profile,
    })
}

fn parse_uuid(raw: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| AppError::internal(format!("Failed to parse UUID in {column}: {e}")))
}

/// Load a user by identifier on an explicit connection (usable inside a
/// transaction)
pub(crate) async fn fetch_user_by_id(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> AppResult<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = $1")
        .bind(user_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by id: {e}")))?;

    row.map(|r| row_to_user(&r)).transpose()
}

/// Load a user by email on an explicit connection
pub(crate) async fn fetch_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> AppResult<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

    row.map(|r| row_to_user(&r)).transpose()
}

/// Write back a trainee's relationship columns (coach back-reference and
/// the two plan buckets)
pub(crate) async fn persist_trainee_refs(
    conn: &mut SqliteConnection,
    trainee_id: Uuid,
    profile: &TraineeProfile,
) -> AppResult<()> {
    let current_json = serde_json::to_string(&profile.current_plans)?;
    let past_json = serde_json::to_string(&profile.past_plans)?;

    let result = sqlx::query(
        r"
        UPDATE users SET
            coach_id = $2,
            current_plans = $3,
            past_plans = $4
        WHERE id = $1 AND kind = 'trainee'
        ",
    )
    .bind(trainee_id.to_string())
    .bind(profile.coach_id.map(|id| id.to_string()))
    .bind(current_json)
    .bind(past_json)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to persist trainee references: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Trainee with ID: {trainee_id}"
        )));
    }
    Ok(())
}

/// Write back a coach's relationship columns (trainee and feedback sets)
pub(crate) async fn persist_coach_refs(
    conn: &mut SqliteConnection,
    coach_id: Uuid,
    profile: &CoachProfile,
) -> AppResult<()> {
    let trainees_json = serde_json::to_string(&profile.trainee_ids)?;
    let feedbacks_json = serde_json::to_string(&profile.feedback_ids)?;

    let result = sqlx::query(
        r"
        UPDATE users SET
            trainee_ids = $2,
            feedback_ids = $3
        WHERE id = $1 AND kind = 'coach'
        ",
    )
    .bind(coach_id.to_string())
    .bind(trainees_json)
    .bind(feedbacks_json)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to persist coach references: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Coach with ID: {coach_id}")));
    }
    Ok(())
}

/// Write back a coach's public profile fields
pub(crate) async fn persist_coach_public_profile(
    conn: &mut SqliteConnection,
    coach_id: Uuid,
    profile: &CoachProfile,
) -> AppResult<()> {
    let qualifications_json = serde_json::to_string(&profile.qualifications)?;
    let specialties_json = serde_json::to_string(&profile.specialties)?;

    let result = sqlx::query(
        r"
        UPDATE users SET
            description = $2,
            image_url = $3,
            qualifications = $4,
            specialties = $5
        WHERE id = $1 AND kind = 'coach'
        ",
    )
    .bind(coach_id.to_string())
    .bind(&profile.description)
    .bind(&profile.image_url)
    .bind(qualifications_json)
    .bind(specialties_json)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to persist coach profile: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Coach with ID: {coach_id}")));
    }
    Ok(())
}

impl Database {
    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already in use by another user
    /// - The database operation fails
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        let (coach_id, current_plans, past_plans) = match user.trainee_profile() {
            Some(profile) => (
                profile.coach_id.map(|id| id.to_string()),
                serde_json::to_string(&profile.current_plans)?,
                serde_json::to_string(&profile.past_plans)?,
            ),
            None => (None, "[]".to_owned(), "[]".to_owned()),
        };
        let (trainee_ids, feedback_ids, description, image_url, qualifications, specialties) =
            match user.coach_profile() {
                Some(profile) => (
                    serde_json::to_string(&profile.trainee_ids)?,
                    serde_json::to_string(&profile.feedback_ids)?,
                    profile.description.clone(),
                    profile.image_url.clone(),
                    serde_json::to_string(&profile.qualifications)?,
                    serde_json::to_string(&profile.specialties)?,
                ),
                None => (
                    "[]".to_owned(),
                    "[]".to_owned(),
                    None,
                    None,
                    "[]".to_owned(),
                    "[]".to_owned(),
                ),
            };

        sqlx::query(
            r"
            INSERT INTO users (
                id, email, display_name, password_hash, phone, kind,
                coach_id, current_plans, past_plans,
                trainee_ids, feedback_ids, description, image_url,
                qualifications, specialties, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.kind().as_str())
        .bind(coach_id)
        .bind(current_plans)
        .bind(past_plans)
        .bind(trainee_ids)
        .bind(feedback_ids)
        .bind(description)
        .bind(image_url)
        .bind(qualifications)
        .bind(specialties)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::duplicate_email(format!("Email already in use: {}", user.email))
            }
            _ => AppError::database(format!("Failed to create user: {e}")),
        })?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let mut conn = self.acquire().await?;
        fetch_user_by_id(&mut conn, user_id).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.acquire().await?;
        fetch_user_by_email(&mut conn, email).await
    }

    /// Update a user's password hash
    ///
    /// The hash is produced by the identity service; this only stores it.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the update fails
    pub async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with ID: {user_id}")));
        }
        Ok(())
    }

    /// Search coaches by display name or email substring, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search_coaches(&self, query: &str) -> AppResult<Vec<User>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let rows = sqlx::query(
            r"
            SELECT * FROM users
            WHERE kind = 'coach'
              AND (LOWER(display_name) LIKE $1 OR LOWER(email) LIKE $1)
            ORDER BY display_name ASC
            ",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to search coaches: {e}")))?;

        let mut coaches = Vec::with_capacity(rows.len());
        for row in rows {
            coaches.push(row_to_user(&row)?);
        }
        Ok(coaches)
    }

    pub(crate) async fn acquire(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }
}
