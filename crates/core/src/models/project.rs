//! Project entity model and DTOs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Column, Entity, EntityKind};
use crate::parse::{self, Required};
use crate::query::ProjectFilter;
use crate::types::{DbId, Timestamp};

/// Status assigned when a payload omits one.
pub const DEFAULT_STATUS: &str = "active";

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw request body for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPayload {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub status: Option<String>,
}

/// Validated project fields. Used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
}

impl ProjectFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl ProjectPayload {
    pub fn into_fields(self) -> Result<ProjectFields, CoreError> {
        let mut required = Required::new();
        let name = required.text("name", self.name);
        required.finish()?;
        Ok(ProjectFields {
            name,
            description: self.description,
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

impl Project {
    /// Build a new record for stores that assign ids themselves.
    pub fn create(id: DbId, fields: ProjectFields, now: Timestamp) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field and refresh `updated_at`.
    pub fn apply(&mut self, fields: ProjectFields, now: Timestamp) {
        self.name = fields.name;
        self.description = fields.description;
        self.status = fields.status;
        self.updated_at = now;
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    type New = ProjectFields;
    type Fields = ProjectFields;
    type Filter = ProjectFilter;

    fn id(&self) -> DbId {
        self.id
    }

    fn reference(&self, _column: Column) -> Option<DbId> {
        None
    }

    fn clear_reference(&mut self, _column: Column) {}

    fn default_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
    }
}
