//! Repository for the `schedules` table.

use pms_core::models::{NewSchedule, Schedule, ScheduleFields};
use pms_core::query::ScheduleFilter;
use pms_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, project_id, issue_id, title, description, start_date, end_date, \
                       created_at, updated_at";

/// Provides CRUD operations for schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    pub async fn create<'e>(
        executor: impl SqliteExecutor<'e>,
        input: &NewSchedule,
        now: Timestamp,
    ) -> Result<Schedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules
                (project_id, issue_id, title, description, start_date, end_date,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING {COLUMNS}"
        );
        let fields = &input.fields;
        sqlx::query_as::<_, Schedule>(&query)
            .bind(input.project_id)
            .bind(fields.issue_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = ?1");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List schedules by start date. `start_date` / `end_date` filters are
    /// inclusive bounds.
    pub async fn list<'e>(
        executor: impl SqliteExecutor<'e>,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedules
             WHERE (?1 IS NULL OR project_id = ?1)
               AND (?2 IS NULL OR start_date >= ?2)
               AND (?3 IS NULL OR end_date <= ?3)
             ORDER BY start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(filter.project_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(executor)
            .await
    }

    pub async fn update<'e>(
        executor: impl SqliteExecutor<'e>,
        id: DbId,
        input: &ScheduleFields,
        now: Timestamp,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!(
            "UPDATE schedules SET
                issue_id = ?2,
                title = ?3,
                description = ?4,
                start_date = ?5,
                end_date = ?6,
                updated_at = ?7
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .bind(input.issue_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    pub async fn delete<'e>(executor: impl SqliteExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
