//! [`Store`] implementation over the SQLite repositories.

use async_trait::async_trait;
use chrono::Utc;
use pms_core::error::CoreError;
use pms_core::integrity;
use pms_core::models::{
    EntityKind, Issue, IssueFields, Milestone, MilestoneFields, NewIssue, NewMilestone,
    NewSchedule, Project, ProjectFields, Schedule, ScheduleFields,
};
use pms_core::query::{IssueFilter, MilestoneFilter, ProjectFilter, ScheduleFilter};
use pms_core::store::{EntityStore, Store};
use pms_core::types::DbId;
use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::error::map_sqlx_error;
use crate::repositories::{IssueRepo, MilestoneRepo, ProjectRepo, ScheduleRepo};
use crate::DbPool;

/// The durable realization. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct SqlStore {
    pool: DbPool,
}

impl SqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open a transaction that holds SQLite's write lock from its first
    /// statement.
    ///
    /// Reference checks and the write then see one snapshot, and a
    /// competing writer waits on the busy timeout instead of failing with
    /// `SQLITE_BUSY` when a deferred read transaction tries to upgrade.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, CoreError> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_sqlx_error)
    }
}

fn not_found(kind: EntityKind, id: DbId) -> CoreError {
    CoreError::not_found(kind.name(), id)
}

async fn check_project(conn: &mut SqliteConnection, project_id: DbId) -> Result<(), CoreError> {
    let exists = ProjectRepo::exists(conn, project_id)
        .await
        .map_err(map_sqlx_error)?;
    integrity::require_project(project_id, exists)
}

async fn check_milestone(
    conn: &mut SqliteConnection,
    milestone_id: Option<DbId>,
    project_id: DbId,
) -> Result<(), CoreError> {
    let Some(milestone_id) = milestone_id else {
        return Ok(());
    };
    let owner = MilestoneRepo::project_of(conn, milestone_id)
        .await
        .map_err(map_sqlx_error)?;
    integrity::require_milestone_in_project(milestone_id, owner, project_id)
}

async fn check_issue(conn: &mut SqliteConnection, issue_id: Option<DbId>) -> Result<(), CoreError> {
    let Some(issue_id) = issue_id else {
        return Ok(());
    };
    let exists = IssueRepo::project_of(conn, issue_id)
        .await
        .map_err(map_sqlx_error)?
        .is_some();
    integrity::require_issue(issue_id, exists)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Project> for SqlStore {
    async fn list(&self, _filter: &ProjectFilter) -> Result<Vec<Project>, CoreError> {
        ProjectRepo::list(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn get(&self, id: DbId) -> Result<Project, CoreError> {
        ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Project, id))
    }

    async fn create(&self, input: ProjectFields) -> Result<Project, CoreError> {
        let project = ProjectRepo::create(&self.pool, &input, Utc::now())
            .await
            .map_err(map_sqlx_error)?;
        tracing::info!(project_id = project.id, "Project created");
        Ok(project)
    }

    async fn update(&self, id: DbId, fields: ProjectFields) -> Result<Project, CoreError> {
        ProjectRepo::update(&self.pool, id, &fields, Utc::now())
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Project, id))
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !ProjectRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        {
            return Err(not_found(EntityKind::Project, id));
        }
        tracing::info!(project_id = id, "Project deleted with its milestones, issues and schedules");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Milestone> for SqlStore {
    async fn list(&self, filter: &MilestoneFilter) -> Result<Vec<Milestone>, CoreError> {
        MilestoneRepo::list(&self.pool, filter)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get(&self, id: DbId) -> Result<Milestone, CoreError> {
        MilestoneRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Milestone, id))
    }

    async fn create(&self, input: NewMilestone) -> Result<Milestone, CoreError> {
        let mut tx = self.begin_write().await?;
        check_project(&mut tx, input.project_id).await?;
        let milestone = MilestoneRepo::create(&mut *tx, &input, Utc::now())
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::info!(
            milestone_id = milestone.id,
            project_id = milestone.project_id,
            "Milestone created"
        );
        Ok(milestone)
    }

    async fn update(&self, id: DbId, fields: MilestoneFields) -> Result<Milestone, CoreError> {
        MilestoneRepo::update(&self.pool, id, &fields, Utc::now())
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Milestone, id))
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !MilestoneRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        {
            return Err(not_found(EntityKind::Milestone, id));
        }
        tracing::info!(milestone_id = id, "Milestone deleted, issues unlinked");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Issue> for SqlStore {
    async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError> {
        IssueRepo::list(&self.pool, filter)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get(&self, id: DbId) -> Result<Issue, CoreError> {
        IssueRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Issue, id))
    }

    async fn create(&self, input: NewIssue) -> Result<Issue, CoreError> {
        let mut tx = self.begin_write().await?;
        check_project(&mut tx, input.project_id).await?;
        check_milestone(&mut tx, input.fields.milestone_id, input.project_id).await?;
        let issue = IssueRepo::create(&mut *tx, &input, Utc::now())
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::info!(issue_id = issue.id, project_id = issue.project_id, "Issue created");
        Ok(issue)
    }

    async fn update(&self, id: DbId, fields: IssueFields) -> Result<Issue, CoreError> {
        let mut tx = self.begin_write().await?;
        let project_id = IssueRepo::project_of(&mut *tx, id)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Issue, id))?;
        check_milestone(&mut tx, fields.milestone_id, project_id).await?;
        let issue = IssueRepo::update(&mut *tx, id, &fields, Utc::now())
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Issue, id))?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(issue)
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !IssueRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        {
            return Err(not_found(EntityKind::Issue, id));
        }
        tracing::info!(issue_id = id, "Issue deleted with its schedules");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Schedule> for SqlStore {
    async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, CoreError> {
        ScheduleRepo::list(&self.pool, filter)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get(&self, id: DbId) -> Result<Schedule, CoreError> {
        ScheduleRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Schedule, id))
    }

    async fn create(&self, input: NewSchedule) -> Result<Schedule, CoreError> {
        let mut tx = self.begin_write().await?;
        check_project(&mut tx, input.project_id).await?;
        check_issue(&mut tx, input.fields.issue_id).await?;
        let schedule = ScheduleRepo::create(&mut *tx, &input, Utc::now())
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::info!(
            schedule_id = schedule.id,
            project_id = schedule.project_id,
            "Schedule created"
        );
        Ok(schedule)
    }

    async fn update(&self, id: DbId, fields: ScheduleFields) -> Result<Schedule, CoreError> {
        let mut tx = self.begin_write().await?;
        if ScheduleRepo::find_by_id(&mut *tx, id)
            .await
            .map_err(map_sqlx_error)?
            .is_none()
        {
            return Err(not_found(EntityKind::Schedule, id));
        }
        check_issue(&mut tx, fields.issue_id).await?;
        let schedule = ScheduleRepo::update(&mut *tx, id, &fields, Utc::now())
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| not_found(EntityKind::Schedule, id))?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(schedule)
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !ScheduleRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        {
            return Err(not_found(EntityKind::Schedule, id));
        }
        tracing::info!(schedule_id = id, "Schedule deleted");
        Ok(())
    }
}

#[async_trait]
impl Store for SqlStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn projects(&self) -> &dyn EntityStore<Project> {
        self
    }

    fn milestones(&self) -> &dyn EntityStore<Milestone> {
        self
    }

    fn issues(&self) -> &dyn EntityStore<Issue> {
        self
    }

    fn schedules(&self) -> &dyn EntityStore<Schedule> {
        self
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}
