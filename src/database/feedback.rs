// ABOUTME: Feedback database operations
// ABOUTME: Row mapping, transaction-scoped writes, and owning-coach reverse lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::users::row_to_user;
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Feedback, User};

/// Convert a database row to a `Feedback`
pub(crate) fn row_to_feedback(row: &SqliteRow) -> AppResult<Feedback> {
    let id: String = row.get("id");
    let trainee_id: String = row.get("trainee_id");

    Ok(Feedback {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse feedback id UUID: {e}")))?,
        rating: row.get("rating"),
        comment: row.get("comment"),
        trainee_id: Uuid::parse_str(&trainee_id).map_err(|e| {
            AppError::internal(format!("Failed to parse feedback trainee UUID: {e}"))
        })?,
    })
}

/// Load a feedback entry by identifier on an explicit connection
pub(crate) async fn fetch_feedback(
    conn: &mut SqliteConnection,
    feedback_id: Uuid,
) -> AppResult<Option<Feedback>> {
    let row = sqlx::query("SELECT * FROM feedback WHERE id = $1")
        .bind(feedback_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get feedback: {e}")))?;

    row.map(|r| row_to_feedback(&r)).transpose()
}

/// Insert a new feedback row
pub(crate) async fn insert_feedback(
    conn: &mut SqliteConnection,
    feedback: &Feedback,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO feedback (id, rating, comment, trainee_id)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(feedback.id.to_string())
    .bind(feedback.rating)
    .bind(&feedback.comment)
    .bind(feedback.trainee_id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create feedback: {e}")))?;

    Ok(())
}

/// Write back a feedback entry's mutable fields
pub(crate) async fn persist_feedback_fields(
    conn: &mut SqliteConnection,
    feedback: &Feedback,
) -> AppResult<()> {
    let result = sqlx::query("UPDATE feedback SET rating = $2, comment = $3 WHERE id = $1")
        .bind(feedback.id.to_string())
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update feedback: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Feedback with ID: {}",
            feedback.id
        )));
    }
    Ok(())
}

/// Delete a feedback row, reporting whether it existed
pub(crate) async fn delete_feedback(
    conn: &mut SqliteConnection,
    feedback_id: Uuid,
) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(feedback_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete feedback: {e}")))?;

    Ok(result.rows_affected() > 0)
}

/// Find the coach whose feedback set contains the given identifier
///
/// Ownership lives in the coach's `feedback_ids` column, not on the feedback
/// row itself; the UUID string cannot appear as a substring of another UUID,
/// so a LIKE match on the JSON text is exact.
pub(crate) async fn fetch_owning_coach(
    conn: &mut SqliteConnection,
    feedback_id: Uuid,
) -> AppResult<Option<User>> {
    let row = sqlx::query(
        r"
        SELECT * FROM users
        WHERE kind = 'coach' AND feedback_ids LIKE '%' || $1 || '%'
        LIMIT 1
        ",
    )
    .bind(feedback_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to find owning coach: {e}")))?;

    row.map(|r| row_to_user(&r)).transpose()
}

impl Database {
    /// Get a feedback entry by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_feedback(&self, feedback_id: Uuid) -> AppResult<Option<Feedback>> {
        let mut conn = self.acquire().await?;
        fetch_feedback(&mut conn, feedback_id).await
    }

    /// Resolve a list of feedback identifiers to records, preserving order
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn get_feedback_by_ids(&self, feedback_ids: &[Uuid]) -> AppResult<Vec<Feedback>> {
        let mut conn = self.acquire().await?;
        let mut entries = Vec::with_capacity(feedback_ids.len());
        for feedback_id in feedback_ids {
            if let Some(feedback) = fetch_feedback(&mut conn, *feedback_id).await? {
                entries.push(feedback);
            }
        }
        Ok(entries)
    }
}
