//! Per-table repositories.
//!
//! Each repository is a zero-sized struct with async functions taking any
//! SQLite executor, so the same query runs against the pool or inside a
//! transaction (`&mut *tx`).

pub mod issue_repo;
pub mod milestone_repo;
pub mod project_repo;
pub mod schedule_repo;

pub use issue_repo::IssueRepo;
pub use milestone_repo::MilestoneRepo;
pub use project_repo::ProjectRepo;
pub use schedule_repo::ScheduleRepo;
