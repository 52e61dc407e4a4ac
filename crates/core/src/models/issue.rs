//! Issue entity model and DTOs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Column, Entity, EntityKind};
use crate::parse::{self, Required};
use crate::query::IssueFilter;
use crate::types::{DbId, Timestamp};

pub const DEFAULT_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "medium";

/// An issue row from the `issues` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub milestone_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw request body. `project_id` is read on create and ignored on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuePayload {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub milestone_id: Option<DbId>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub assignee: Option<String>,
}

/// Editable issue fields, including the milestone link.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFields {
    pub milestone_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
}

impl IssueFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            milestone_id: None,
            title: title.into(),
            description: None,
            status: DEFAULT_STATUS.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            assignee: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project_id: DbId,
    pub fields: IssueFields,
}

impl IssuePayload {
    pub fn into_new(self) -> Result<NewIssue, CoreError> {
        let mut required = Required::new();
        let project_id = required.id("project_id", self.project_id);
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(NewIssue { project_id, fields })
    }

    pub fn into_fields(self) -> Result<IssueFields, CoreError> {
        let mut required = Required::new();
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(fields)
    }

    fn narrow(self, required: &mut Required) -> IssueFields {
        IssueFields {
            milestone_id: self.milestone_id,
            title: required.text("title", self.title),
            description: self.description,
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            priority: self.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            assignee: self.assignee,
        }
    }
}

impl Issue {
    pub fn create(id: DbId, input: NewIssue, now: Timestamp) -> Self {
        let NewIssue { project_id, fields } = input;
        Self {
            id,
            project_id,
            milestone_id: fields.milestone_id,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            assignee: fields.assignee,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: IssueFields, now: Timestamp) {
        self.milestone_id = fields.milestone_id;
        self.title = fields.title;
        self.description = fields.description;
        self.status = fields.status;
        self.priority = fields.priority;
        self.assignee = fields.assignee;
        self.updated_at = now;
    }
}

impl Entity for Issue {
    const KIND: EntityKind = EntityKind::Issue;
    type New = NewIssue;
    type Fields = IssueFields;
    type Filter = IssueFilter;

    fn id(&self) -> DbId {
        self.id
    }

    fn reference(&self, column: Column) -> Option<DbId> {
        match column {
            Column::ProjectId => Some(self.project_id),
            Column::MilestoneId => self.milestone_id,
            Column::IssueId => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        if column == Column::MilestoneId {
            self.milestone_id = None;
        }
    }

    fn default_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
    }
}
