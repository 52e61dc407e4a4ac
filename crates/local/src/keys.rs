//! Fixed keys of the four entity collections.

use pms_core::models::EntityKind;

pub const PROJECTS: &str = "pms_projects";
pub const MILESTONES: &str = "pms_milestones";
pub const ISSUES: &str = "pms_issues";
pub const SCHEDULES: &str = "pms_schedules";

pub fn for_kind(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Project => PROJECTS,
        EntityKind::Milestone => MILESTONES,
        EntityKind::Issue => ISSUES,
        EntityKind::Schedule => SCHEDULES,
    }
}
