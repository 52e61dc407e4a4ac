//! Referential integrity rules.
//!
//! [`FOREIGN_KEYS`] is the single declaration of the cascade graph. The SQL
//! migration declares the same actions as table constraints; stores without
//! native constraints run [`Dataset::delete`] instead, which walks the graph
//! over in-memory collections.

use std::collections::{BTreeSet, VecDeque};

use crate::error::CoreError;
use crate::models::{Column, Entity, EntityKind, Issue, Milestone, Project, Schedule};
use crate::types::DbId;

/// What happens to a child row when its parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
}

impl ReferentialAction {
    /// The `ON DELETE` clause for this action.
    pub fn sql(self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub child: EntityKind,
    pub column: Column,
    pub parent: EntityKind,
    pub on_delete: ReferentialAction,
}

pub static FOREIGN_KEYS: [ForeignKey; 5] = [
    ForeignKey {
        child: EntityKind::Milestone,
        column: Column::ProjectId,
        parent: EntityKind::Project,
        on_delete: ReferentialAction::Cascade,
    },
    ForeignKey {
        child: EntityKind::Issue,
        column: Column::ProjectId,
        parent: EntityKind::Project,
        on_delete: ReferentialAction::Cascade,
    },
    ForeignKey {
        child: EntityKind::Issue,
        column: Column::MilestoneId,
        parent: EntityKind::Milestone,
        on_delete: ReferentialAction::SetNull,
    },
    ForeignKey {
        child: EntityKind::Schedule,
        column: Column::ProjectId,
        parent: EntityKind::Project,
        on_delete: ReferentialAction::Cascade,
    },
    ForeignKey {
        child: EntityKind::Schedule,
        column: Column::IssueId,
        parent: EntityKind::Issue,
        on_delete: ReferentialAction::Cascade,
    },
];

/// Foreign keys whose parent is `kind`.
pub fn references_to(kind: EntityKind) -> impl Iterator<Item = &'static ForeignKey> {
    FOREIGN_KEYS.iter().filter(move |fk| fk.parent == kind)
}

// ---------------------------------------------------------------------------
// Write-time reference checks
// ---------------------------------------------------------------------------

pub fn require_project(project_id: DbId, exists: bool) -> Result<(), CoreError> {
    if exists {
        Ok(())
    } else {
        Err(CoreError::dangling_reference("project_id", project_id, "project"))
    }
}

/// `owner` is the project the milestone belongs to, `None` if it does not exist.
pub fn require_milestone_in_project(
    milestone_id: DbId,
    owner: Option<DbId>,
    project_id: DbId,
) -> Result<(), CoreError> {
    match owner {
        None => Err(CoreError::dangling_reference(
            "milestone_id",
            milestone_id,
            "milestone",
        )),
        Some(owner) if owner != project_id => Err(CoreError::Validation(format!(
            "milestone_id {milestone_id} belongs to project {owner}, not project {project_id}"
        ))),
        Some(_) => Ok(()),
    }
}

pub fn require_issue(issue_id: DbId, exists: bool) -> Result<(), CoreError> {
    if exists {
        Ok(())
    } else {
        Err(CoreError::dangling_reference("issue_id", issue_id, "issue"))
    }
}

// ---------------------------------------------------------------------------
// In-memory cascade engine
// ---------------------------------------------------------------------------

/// All four collections, loaded together so a delete can be applied as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub projects: Vec<Project>,
    pub milestones: Vec<Milestone>,
    pub issues: Vec<Issue>,
    pub schedules: Vec<Schedule>,
}

/// Records affected by one delete, including the target itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: Vec<(EntityKind, DbId)>,
    pub nullified: Vec<(EntityKind, DbId)>,
}

impl DeleteOutcome {
    /// Collections that must be persisted again.
    pub fn touched(&self) -> BTreeSet<EntityKind> {
        self.removed
            .iter()
            .chain(&self.nullified)
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn removed_count(&self, kind: EntityKind) -> usize {
        self.removed.iter().filter(|(k, _)| *k == kind).count()
    }
}

fn remove_by_id<E: Entity>(records: &mut Vec<E>, id: DbId) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

fn ids_referencing<E: Entity>(records: &[E], column: Column, parent_id: DbId) -> Vec<DbId> {
    records
        .iter()
        .filter(|r| r.reference(column) == Some(parent_id))
        .map(Entity::id)
        .collect()
}

fn clear_references<E: Entity>(records: &mut [E], column: Column, parent_id: DbId) -> Vec<DbId> {
    records
        .iter_mut()
        .filter(|r| r.reference(column) == Some(parent_id))
        .map(|r| {
            r.clear_reference(column);
            r.id()
        })
        .collect()
}

impl Dataset {
    pub fn contains(&self, kind: EntityKind, id: DbId) -> bool {
        match kind {
            EntityKind::Project => self.projects.iter().any(|r| r.id == id),
            EntityKind::Milestone => self.milestones.iter().any(|r| r.id == id),
            EntityKind::Issue => self.issues.iter().any(|r| r.id == id),
            EntityKind::Schedule => self.schedules.iter().any(|r| r.id == id),
        }
    }

    fn remove(&mut self, kind: EntityKind, id: DbId) -> bool {
        match kind {
            EntityKind::Project => remove_by_id(&mut self.projects, id),
            EntityKind::Milestone => remove_by_id(&mut self.milestones, id),
            EntityKind::Issue => remove_by_id(&mut self.issues, id),
            EntityKind::Schedule => remove_by_id(&mut self.schedules, id),
        }
    }

    fn referencing(&self, fk: &ForeignKey, parent_id: DbId) -> Vec<DbId> {
        match fk.child {
            EntityKind::Project => ids_referencing(&self.projects, fk.column, parent_id),
            EntityKind::Milestone => ids_referencing(&self.milestones, fk.column, parent_id),
            EntityKind::Issue => ids_referencing(&self.issues, fk.column, parent_id),
            EntityKind::Schedule => ids_referencing(&self.schedules, fk.column, parent_id),
        }
    }

    fn nullify(&mut self, fk: &ForeignKey, parent_id: DbId) -> Vec<DbId> {
        match fk.child {
            EntityKind::Project => clear_references(&mut self.projects, fk.column, parent_id),
            EntityKind::Milestone => clear_references(&mut self.milestones, fk.column, parent_id),
            EntityKind::Issue => clear_references(&mut self.issues, fk.column, parent_id),
            EntityKind::Schedule => clear_references(&mut self.schedules, fk.column, parent_id),
        }
    }

    /// Delete a record and apply every referential action it triggers.
    ///
    /// Returns `None` (and leaves the dataset untouched) when the record does
    /// not exist. Nullified foreign keys do not refresh `updated_at`.
    pub fn delete(&mut self, kind: EntityKind, id: DbId) -> Option<DeleteOutcome> {
        if !self.contains(kind, id) {
            return None;
        }

        let mut outcome = DeleteOutcome::default();
        let mut pending = VecDeque::from([(kind, id)]);

        while let Some((kind, id)) = pending.pop_front() {
            if !self.remove(kind, id) {
                // Already removed through another path (e.g. a schedule that
                // references both the project and one of its issues).
                continue;
            }
            outcome.removed.push((kind, id));

            for fk in references_to(kind) {
                match fk.on_delete {
                    ReferentialAction::Cascade => {
                        pending.extend(self.referencing(fk, id).into_iter().map(|c| (fk.child, c)));
                    }
                    ReferentialAction::SetNull => {
                        outcome
                            .nullified
                            .extend(self.nullify(fk, id).into_iter().map(|c| (fk.child, c)));
                    }
                }
            }
        }

        let removed = outcome.removed.clone();
        outcome.nullified.retain(|n| !removed.contains(n));
        Some(outcome)
    }
}
