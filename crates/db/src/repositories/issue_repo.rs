//! Repository for the `issues` table.

use pms_core::models::{Issue, IssueFields, NewIssue};
use pms_core::query::IssueFilter;
use pms_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, project_id, milestone_id, title, description, status, priority, \
                       assignee, created_at, updated_at";

/// Provides CRUD operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    pub async fn create<'e>(
        executor: impl SqliteExecutor<'e>,
        input: &NewIssue,
        now: Timestamp,
    ) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues
                (project_id, milestone_id, title, description, status, priority, assignee,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {COLUMNS}"
        );
        let fields = &input.fields;
        sqlx::query_as::<_, Issue>(&query)
            .bind(input.project_id)
            .bind(fields.milestone_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.status)
            .bind(&fields.priority)
            .bind(&fields.assignee)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = ?1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The owning project of an issue, `None` if the issue does not exist.
    pub async fn project_of<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT project_id FROM issues WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List issues matching every present filter, newest first.
    pub async fn list<'e>(
        executor: impl SqliteExecutor<'e>,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE (?1 IS NULL OR project_id = ?1)
               AND (?2 IS NULL OR milestone_id = ?2)
               AND (?3 IS NULL OR status = ?3)
               AND (?4 IS NULL OR priority = ?4)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(filter.project_id)
            .bind(filter.milestone_id)
            .bind(&filter.status)
            .bind(&filter.priority)
            .fetch_all(executor)
            .await
    }

    pub async fn update<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
        input: &IssueFields,
        now: Timestamp,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET
                milestone_id = ?2,
                title = ?3,
                description = ?4,
                status = ?5,
                priority = ?6,
                assignee = ?7,
                updated_at = ?8
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(input.milestone_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(&input.assignee)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Delete an issue; schedules attached to it go with it.
    pub async fn delete<'e>(executor: impl SqliteExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
