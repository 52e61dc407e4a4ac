//! Schedule entity model and DTOs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Column, Entity, EntityKind};
use crate::parse::{self, Required};
use crate::query::ScheduleFilter;
use crate::types::{DbId, Timestamp};

/// A schedule row from the `schedules` table.
///
/// `start_date` and `end_date` are not checked against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Schedule {
    pub id: DbId,
    pub project_id: DbId,
    pub issue_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePayload {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub issue_id: Option<DbId>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleFields {
    pub issue_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl ScheduleFields {
    pub fn spanning(title: impl Into<String>, start_date: Timestamp, end_date: Timestamp) -> Self {
        Self {
            issue_id: None,
            title: title.into(),
            description: None,
            start_date,
            end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub project_id: DbId,
    pub fields: ScheduleFields,
}

impl SchedulePayload {
    pub fn into_new(self) -> Result<NewSchedule, CoreError> {
        let mut required = Required::new();
        let project_id = required.id("project_id", self.project_id);
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(NewSchedule { project_id, fields })
    }

    pub fn into_fields(self) -> Result<ScheduleFields, CoreError> {
        let mut required = Required::new();
        let fields = self.narrow(&mut required);
        required.finish()?;
        Ok(fields)
    }

    fn narrow(self, required: &mut Required) -> ScheduleFields {
        ScheduleFields {
            issue_id: self.issue_id,
            title: required.text("title", self.title),
            description: self.description,
            start_date: required.timestamp("start_date", self.start_date),
            end_date: required.timestamp("end_date", self.end_date),
        }
    }
}

impl Schedule {
    pub fn create(id: DbId, input: NewSchedule, now: Timestamp) -> Self {
        let NewSchedule { project_id, fields } = input;
        Self {
            id,
            project_id,
            issue_id: fields.issue_id,
            title: fields.title,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: ScheduleFields, now: Timestamp) {
        self.issue_id = fields.issue_id;
        self.title = fields.title;
        self.description = fields.description;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.updated_at = now;
    }
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;
    type New = NewSchedule;
    type Fields = ScheduleFields;
    type Filter = ScheduleFilter;

    fn id(&self) -> DbId {
        self.id
    }

    fn reference(&self, column: Column) -> Option<DbId> {
        match column {
            Column::ProjectId => Some(self.project_id),
            Column::IssueId => self.issue_id,
            Column::MilestoneId => None,
        }
    }

    fn clear_reference(&mut self, column: Column) {
        if column == Column::IssueId {
            self.issue_id = None;
        }
    }

    fn default_order(a: &Self, b: &Self) -> Ordering {
        a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id))
    }
}
