//! [`Store`] implementation over a [`KeyValueStore`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pms_core::error::CoreError;
use pms_core::integrity::{self, Dataset};
use pms_core::models::{
    Entity, EntityKind, Issue, IssueFields, Milestone, MilestoneFields, NewIssue, NewMilestone,
    NewSchedule, Project, ProjectFields, Schedule, ScheduleFields,
};
use pms_core::query::{self, IssueFilter, MilestoneFilter, ProjectFilter, ScheduleFilter};
use pms_core::store::{EntityStore, Store};
use pms_core::types::{DbId, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::KvError;
use crate::keys;
use crate::kv::{KeyValueStore, MemoryKv};
use crate::seed::seed_dataset;

/// A record type the local mirror can persist.
trait Stored: Entity + Serialize + DeserializeOwned {}

impl<E: Entity + Serialize + DeserializeOwned> Stored for E {}

/// The local-mirror realization.
///
/// Every operation runs inside one critical section guarded by an async
/// mutex, so read-modify-write sequences never interleave.
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
    seed: bool,
    /// `true` once the first-access seeding check has run.
    checked: Mutex<bool>,
}

impl LocalStore {
    /// Seeding is enabled by default.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            seed: true,
            checked: Mutex::new(false),
        }
    }

    /// An unseeded store over process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::new())).with_seed(false)
    }

    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    /// Enter the critical section, seeding the collections on first access.
    async fn session(&self) -> Result<Session<'_>, CoreError> {
        let mut session = Session {
            kv: self.kv.as_ref(),
            checked: self.checked.lock().await,
        };
        if !*session.checked {
            if self.seed && self.kv.get(keys::PROJECTS).await?.is_none() {
                let data = seed_dataset(Utc::now());
                // Projects last: their key marks a complete seed.
                for kind in EntityKind::ALL.into_iter().rev() {
                    session.write_kind(&data, kind).await?;
                }
                tracing::info!("Local store seeded with sample records");
            }
            *session.checked = true;
        }
        Ok(session)
    }
}

/// Exclusive access to the collections for the duration of one operation.
struct Session<'a> {
    kv: &'a dyn KeyValueStore,
    checked: MutexGuard<'a, bool>,
}

impl Session<'_> {
    async fn read<E: Stored>(&self) -> Result<Vec<E>, CoreError> {
        let key = keys::for_kind(E::KIND);
        match self.kv.get(key).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                KvError::Corrupt {
                    key: key.to_string(),
                    source,
                }
                .into()
            }),
        }
    }

    async fn write<E: Stored>(&self, records: &[E]) -> Result<(), CoreError> {
        let key = keys::for_kind(E::KIND);
        let raw = serde_json::to_string(records).map_err(|source| KvError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &raw).await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Dataset, CoreError> {
        Ok(Dataset {
            projects: self.read().await?,
            milestones: self.read().await?,
            issues: self.read().await?,
            schedules: self.read().await?,
        })
    }

    async fn write_kind(&self, data: &Dataset, kind: EntityKind) -> Result<(), CoreError> {
        match kind {
            EntityKind::Project => self.write(&data.projects).await,
            EntityKind::Milestone => self.write(&data.milestones).await,
            EntityKind::Issue => self.write(&data.issues).await,
            EntityKind::Schedule => self.write(&data.schedules).await,
        }
    }

    async fn contains<E: Stored>(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.read::<E>().await?.iter().any(|r| r.id() == id))
    }

    async fn find<E: Stored>(&self, id: DbId) -> Result<E, CoreError> {
        self.read::<E>()
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| CoreError::not_found(E::KIND.name(), id))
    }

    /// Append a record built with the next free id.
    ///
    /// The id is one past the current maximum, so deleting the newest record
    /// frees its id for the next insert.
    async fn insert<E: Stored>(
        &self,
        build: impl FnOnce(DbId, Timestamp) -> E + Send,
    ) -> Result<E, CoreError> {
        let mut records = self.read::<E>().await?;
        let id = records.iter().map(Entity::id).max().map_or(1, |max| max + 1);
        let record = build(id, Utc::now());
        records.push(record.clone());
        self.write(&records).await?;
        Ok(record)
    }

    /// Modify one record in place and persist its collection.
    async fn modify<E: Stored>(
        &self,
        id: DbId,
        apply: impl FnOnce(&mut E, Timestamp) + Send,
    ) -> Result<E, CoreError> {
        let mut records = self.read::<E>().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| CoreError::not_found(E::KIND.name(), id))?;
        apply(record, Utc::now());
        let updated = record.clone();
        self.write(&records).await?;
        Ok(updated)
    }

    /// Delete a record and apply its referential actions.
    ///
    /// Collections are written parent-first. If a write fails, collections
    /// already written are restored from the snapshot taken before the
    /// delete and the failure is reported as a storage error.
    async fn remove(&self, kind: EntityKind, id: DbId) -> Result<(), CoreError> {
        let before = self.read_all().await?;
        let mut after = before.clone();
        let outcome = after
            .delete(kind, id)
            .ok_or_else(|| CoreError::not_found(kind.name(), id))?;

        let mut written = Vec::new();
        for touched in outcome.touched() {
            if let Err(err) = self.write_kind(&after, touched).await {
                for done in written {
                    if let Err(restore_err) = self.write_kind(&before, done).await {
                        tracing::error!(
                            collection = %done,
                            error = %restore_err,
                            "Failed to restore collection after partial delete"
                        );
                    }
                }
                return Err(err);
            }
            written.push(touched);
        }

        tracing::info!(
            entity = %kind,
            id,
            removed = outcome.removed.len(),
            nullified = outcome.nullified.len(),
            "Record deleted"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Project> for LocalStore {
    async fn list(&self, filter: &ProjectFilter) -> Result<Vec<Project>, CoreError> {
        let session = self.session().await?;
        Ok(query::select(&session.read().await?, filter))
    }

    async fn get(&self, id: DbId) -> Result<Project, CoreError> {
        self.session().await?.find(id).await
    }

    async fn create(&self, input: ProjectFields) -> Result<Project, CoreError> {
        let session = self.session().await?;
        let project = session
            .insert(|id, now| Project::create(id, input, now))
            .await?;
        tracing::info!(project_id = project.id, "Project created");
        Ok(project)
    }

    async fn update(&self, id: DbId, fields: ProjectFields) -> Result<Project, CoreError> {
        let session = self.session().await?;
        session
            .modify(id, |project: &mut Project, now| project.apply(fields, now))
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.session().await?.remove(EntityKind::Project, id).await
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore<Milestone> for LocalStore {
    async fn list(&self, filter: &MilestoneFilter) -> Result<Vec<Milestone>, CoreError> {
        let session = self.session().await?;
        Ok(query::select(&session.read().await?, filter))
    }

    async fn get(&self, id: DbId) -> Result<Milestone, CoreError> {
        self.session().await?.find(id).await
    }

    async fn create(&self, input: NewMilestone) -> Result<Milestone, CoreError> {
        let session = self.session().await?;
        let exists = session.contains::<Project>(input.project_id).await?;
        integrity::require_project(input.project_id, exists)?;

        let milestone = session
            .insert(|id, now| Milestone::create(id, input, now))
            .await?;
        tracing::info!(
            milestone_id = milestone.id,
            project_id = milestone.project_id,
            "Milestone created"
        );
        Ok(milestone)
    }

    async fn update(&self, id: DbId, fields: MilestoneFields) -> Result<Milestone, CoreError> {
        let session = self.session().await?;
        session
            .modify(id, |milestone: &mut Milestone, now| {
                milestone.apply(fields, now)
            })
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.session().await?.remove(EntityKind::Milestone, id).await
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

async fn check_milestone(
    session: &Session<'_>,
    milestone_id: Option<DbId>,
    project_id: DbId,
) -> Result<(), CoreError> {
    let Some(milestone_id) = milestone_id else {
        return Ok(());
    };
    let owner = session
        .read::<Milestone>()
        .await?
        .into_iter()
        .find(|m| m.id == milestone_id)
        .map(|m| m.project_id);
    integrity::require_milestone_in_project(milestone_id, owner, project_id)
}

#[async_trait]
impl EntityStore<Issue> for LocalStore {
    async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError> {
        let session = self.session().await?;
        Ok(query::select(&session.read().await?, filter))
    }

    async fn get(&self, id: DbId) -> Result<Issue, CoreError> {
        self.session().await?.find(id).await
    }

    async fn create(&self, input: NewIssue) -> Result<Issue, CoreError> {
        let session = self.session().await?;
        let exists = session.contains::<Project>(input.project_id).await?;
        integrity::require_project(input.project_id, exists)?;
        check_milestone(&session, input.fields.milestone_id, input.project_id).await?;

        let issue = session.insert(|id, now| Issue::create(id, input, now)).await?;
        tracing::info!(issue_id = issue.id, project_id = issue.project_id, "Issue created");
        Ok(issue)
    }

    async fn update(&self, id: DbId, fields: IssueFields) -> Result<Issue, CoreError> {
        let session = self.session().await?;
        let current: Issue = session.find(id).await?;
        check_milestone(&session, fields.milestone_id, current.project_id).await?;

        session
            .modify(id, |issue: &mut Issue, now| issue.apply(fields, now))
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.session().await?.remove(EntityKind::Issue, id).await
    }
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

async fn check_issue(session: &Session<'_>, issue_id: Option<DbId>) -> Result<(), CoreError> {
    let Some(issue_id) = issue_id else {
        return Ok(());
    };
    let exists = session.contains::<Issue>(issue_id).await?;
    integrity::require_issue(issue_id, exists)
}

#[async_trait]
impl EntityStore<Schedule> for LocalStore {
    async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, CoreError> {
        let session = self.session().await?;
        Ok(query::select(&session.read().await?, filter))
    }

    async fn get(&self, id: DbId) -> Result<Schedule, CoreError> {
        self.session().await?.find(id).await
    }

    async fn create(&self, input: NewSchedule) -> Result<Schedule, CoreError> {
        let session = self.session().await?;
        let exists = session.contains::<Project>(input.project_id).await?;
        integrity::require_project(input.project_id, exists)?;
        check_issue(&session, input.fields.issue_id).await?;

        let schedule = session
            .insert(|id, now| Schedule::create(id, input, now))
            .await?;
        tracing::info!(
            schedule_id = schedule.id,
            project_id = schedule.project_id,
            "Schedule created"
        );
        Ok(schedule)
    }

    async fn update(&self, id: DbId, fields: ScheduleFields) -> Result<Schedule, CoreError> {
        let session = self.session().await?;
        if !session.contains::<Schedule>(id).await? {
            return Err(CoreError::not_found(EntityKind::Schedule.name(), id));
        }
        check_issue(&session, fields.issue_id).await?;

        session
            .modify(id, |schedule: &mut Schedule, now| schedule.apply(fields, now))
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.session().await?.remove(EntityKind::Schedule, id).await
    }
}

#[async_trait]
impl Store for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
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
        self.kv.get(keys::PROJECTS).await?;
        Ok(())
    }

    async fn close(&self) {
        // Wait for any in-flight operation; every write is already durable.
        let _guard = self.checked.lock().await;
        tracing::info!("Local store closed");
    }
}
