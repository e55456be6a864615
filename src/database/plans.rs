// ABOUTME: Workout plan database operations
// ABOUTME: Row mapping plus transaction-scoped insert, update, and delete helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Plan;

/// Convert a database row to a `Plan`
pub(crate) fn row_to_plan(row: &SqliteRow) -> AppResult<Plan> {
    let id: String = row.get("id");
    let coach_id: String = row.get("coach_id");
    let trainee_id: String = row.get("trainee_id");
    let exercises: String = row.get("exercises");

    Ok(Plan {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::internal(format!("Failed to parse plan id UUID: {e}")))?,
        name: row.get("name"),
        description: row.get("description"),
        exercises: serde_json::from_str(&exercises)?,
        note: row.get("note"),
        coach_id: Uuid::parse_str(&coach_id)
            .map_err(|e| AppError::internal(format!("Failed to parse plan coach UUID: {e}")))?,
        trainee_id: Uuid::parse_str(&trainee_id)
            .map_err(|e| AppError::internal(format!("Failed to parse plan trainee UUID: {e}")))?,
        created_at: row.get("created_at"),
        active: row.get("active"),
    })
}

/// Load a plan by identifier on an explicit connection
pub(crate) async fn fetch_plan(
    conn: &mut SqliteConnection,
    plan_id: Uuid,
) -> AppResult<Option<Plan>> {
    let row = sqlx::query("SELECT * FROM plans WHERE id = $1")
        .bind(plan_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;

    row.map(|r| row_to_plan(&r)).transpose()
}

/// Insert a new plan row
pub(crate) async fn insert_plan(conn: &mut SqliteConnection, plan: &Plan) -> AppResult<()> {
    let exercises_json = serde_json::to_string(&plan.exercises)?;

    sqlx::query(
        r"
        INSERT INTO plans (
            id, name, description, exercises, note,
            coach_id, trainee_id, created_at, active
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(plan.id.to_string())
    .bind(&plan.name)
    .bind(&plan.description)
    .bind(exercises_json)
    .bind(&plan.note)
    .bind(plan.coach_id.to_string())
    .bind(plan.trainee_id.to_string())
    .bind(plan.created_at)
    .bind(plan.active)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

    Ok(())
}

/// Write back a plan's mutable fields (references and creation time are fixed)
pub(crate) async fn persist_plan_fields(conn: &mut SqliteConnection, plan: &Plan) -> AppResult<()> {
    let exercises_json = serde_json::to_string(&plan.exercises)?;

    let result = sqlx::query(
        r"
        UPDATE plans SET
            name = $2,
            description = $3,
            exercises = $4,
            note = $5,
            active = $6
        WHERE id = $1
        ",
    )
    .bind(plan.id.to_string())
    .bind(&plan.name)
    .bind(&plan.description)
    .bind(exercises_json)
    .bind(&plan.note)
    .bind(plan.active)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to update plan: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Plan with ID: {}", plan.id)));
    }
    Ok(())
}

/// Delete a plan row, reporting whether it existed
pub(crate) async fn delete_plan(conn: &mut SqliteConnection, plan_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(plan_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete plan: {e}")))?;

    Ok(result.rows_affected() > 0)
}

impl Database {
    /// Get a plan by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<Option<Plan>> {
        let mut conn = self.acquire().await?;
        fetch_plan(&mut conn, plan_id).await
    }

    /// Resolve a list of plan identifiers to records, preserving order
    ///
    /// Identifiers that no longer resolve are skipped; a trainee bucket can
    /// only reference live plans, so a miss here indicates external
    /// tampering rather than a normal state.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn get_plans_by_ids(&self, plan_ids: &[Uuid]) -> AppResult<Vec<Plan>> {
        let mut conn = self.acquire().await?;
        let mut plans = Vec::with_capacity(plan_ids.len());
        for plan_id in plan_ids {
            if let Some(plan) = fetch_plan(&mut conn, *plan_id).await? {
                plans.push(plan);
            }
        }
        Ok(plans)
    }
}
