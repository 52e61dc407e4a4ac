//! Milestone entity model and DTOs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Column, Entity, EntityKind};
use crate::parse::{self, Required};
use crate::query::MilestoneFilter;
use crate::types::{Date, DbId, Timestamp};

pub const DEFAULT_STATUS: &str = "open";

/// A milestone row from the `milestones` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw request body. `project_id` is read on create and ignored on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestonePayload {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub status: Option<String>,
}

/// Editable milestone fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneFields {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: String,
}

impl MilestoneFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// Validated input for creating a milestone.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMilestone {
    pub project_id: DbId,
    pub fields: MilestoneFields,
}

impl MilestonePayload {
    pub fn into_new(self) -> Result<NewMilestone, CoreError> {
        let mut required = Required::new();
        let project_id = required.id("project_id", self.project_id);
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(NewMilestone { project_id, fields })
    }

    pub fn into_fields(self) -> Result<MilestoneFields, CoreError> {
        let mut required = Required::new();
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(fields)
    }

    fn narrow(self, required: &mut Required) -> MilestoneFields {
        MilestoneFields {
            title: required.text("title", self.title),
            description: self.description,
            due_date: required.optional_date("due_date", self.due_date),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}

impl Milestone {
    pub fn create(id: DbId, input: NewMilestone, now: Timestamp) -> Self {
        let NewMilestone { project_id, fields } = input;
        Self {
            id,
            project_id,
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: MilestoneFields, now: Timestamp) {
        self.title = fields.title;
        self.description = fields.description;
        self.due_date = fields.due_date;
        self.status = fields.status;
        self.updated_at = now;
    }
}

impl Entity for Milestone {
    const KIND: EntityKind = EntityKind::Milestone;
    type New = NewMilestone;
    type Fields = MilestoneFields;
    type Filter = MilestoneFilter;

    fn id(&self) -> DbId {
        self.id
    }

    fn reference(&self, column: Column) -> Option<DbId> {
        match column {
            Column::ProjectId => Some(self.project_id),
            _ => None,
        }
    }

    fn clear_reference(&mut self, _column: Column) {}

    /// Due date ascending with undated milestones first, matching SQLite's
    /// `NULL` ordering.
    fn default_order(a: &Self, b: &Self) -> Ordering {
        a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id))
    }
}
