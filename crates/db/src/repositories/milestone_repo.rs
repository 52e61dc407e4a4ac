//! Repository for the `milestones` table.

use pms_core::models::{Milestone, MilestoneFields, NewMilestone};
use pms_core::query::MilestoneFilter;
use pms_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

const COLUMNS: &str =
    "id, project_id, title, description, due_date, status, created_at, updated_at";

/// Provides CRUD operations for milestones.
pub struct MilestoneRepo;

impl MilestoneRepo {
    pub async fn create<'e>(
        executor: impl SqliteExecutor<'e>,
        input: &NewMilestone,
        now: Timestamp,
    ) -> Result<Milestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones
                (project_id, title, description, due_date, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {COLUMNS}"
        );
        let fields = &input.fields;
        sqlx::query_as::<_, Milestone>(&query)
            .bind(input.project_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.due_date)
            .bind(&fields.status)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = ?1");
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The owning project of a milestone, `None` if the milestone does not exist.
    pub async fn project_of<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT project_id FROM milestones WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List milestones by due date, undated first.
    pub async fn list<'e>(
        executor: impl SqliteExecutor<'e>,
        filter: &MilestoneFilter,
    ) -> Result<Vec<Milestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones
             WHERE (?1 IS NULL OR project_id = ?1)
             ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(filter.project_id)
            .fetch_all(executor)
            .await
    }

    pub async fn update<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
        input: &MilestoneFields,
        now: Timestamp,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                title = ?2,
                description = ?3,
                due_date = ?4,
                status = ?5,
                updated_at = ?6
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_date)
            .bind(&input.status)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Delete a milestone. Issues keep existing with `milestone_id` cleared.
    pub async fn delete<'e>(executor: impl SqliteExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
