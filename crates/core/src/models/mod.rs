//! Entity schema: the four record types, their request payloads, and the
//! validated inputs a store accepts.

pub mod issue;
pub mod milestone;
pub mod project;
pub mod schedule;

use std::cmp::Ordering;
use std::fmt;

use crate::query::RecordFilter;
use crate::types::DbId;

pub use issue::{Issue, IssueFields, IssuePayload, NewIssue};
pub use milestone::{Milestone, MilestoneFields, MilestonePayload, NewMilestone};
pub use project::{Project, ProjectFields, ProjectPayload};
pub use schedule::{NewSchedule, Schedule, ScheduleFields, SchedulePayload};

/// The four entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Project,
    Milestone,
    Issue,
    Schedule,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Project,
        EntityKind::Milestone,
        EntityKind::Issue,
        EntityKind::Schedule,
    ];

    /// Display name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Project => "Project",
            EntityKind::Milestone => "Milestone",
            EntityKind::Issue => "Issue",
            EntityKind::Schedule => "Schedule",
        }
    }

    /// Table name in the durable realization.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Milestone => "milestones",
            EntityKind::Issue => "issues",
            EntityKind::Schedule => "schedules",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Foreign-key columns that link child records to their parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ProjectId,
    MilestoneId,
    IssueId,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::ProjectId => "project_id",
            Column::MilestoneId => "milestone_id",
            Column::IssueId => "issue_id",
        }
    }
}

/// Common surface of the four record types.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Validated input for `create`.
    type New: Send + Sync;
    /// Validated editable fields for `update`.
    type Fields: Send + Sync;
    /// Optional criteria accepted by `list`.
    type Filter: RecordFilter<Self> + Default + Send + Sync;

    fn id(&self) -> DbId;

    /// Value of a foreign-key column, `None` when unset or not a column of
    /// this entity.
    fn reference(&self, column: Column) -> Option<DbId>;

    /// Clear a nullable foreign-key column. Required columns are untouched.
    fn clear_reference(&mut self, column: Column);

    /// Default list order.
    fn default_order(a: &Self, b: &Self) -> Ordering;
}
