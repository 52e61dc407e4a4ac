//! List filters and default ordering.
//!
//! Every filter field is optional and fields are ANDed. An absent (or blank)
//! field imposes no constraint. The in-memory realization evaluates filters
//! with [`RecordFilter::matches`]; the SQL realization renders the same
//! predicates as `(?N IS NULL OR column = ?N)` clauses.

use serde::Deserialize;

use crate::models::{Entity, Issue, Milestone, Project, Schedule};
use crate::parse;
use crate::types::{DbId, Timestamp};

/// A predicate over one record type.
pub trait RecordFilter<E> {
    fn matches(&self, record: &E) -> bool;
}

/// Projects have no filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneFilter {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub milestone_id: Option<DbId>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "parse::optional_text")]
    pub priority: Option<String>,
}

/// `start_date` is an inclusive lower bound on the schedule's start and
/// `end_date` an inclusive upper bound on its end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    #[serde(default, deserialize_with = "parse::optional_id")]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "parse::optional_timestamp")]
    pub start_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "parse::optional_timestamp")]
    pub end_date: Option<Timestamp>,
}

/// `None` matches everything.
fn eq<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
    wanted.as_ref().map_or(true, |w| w == actual)
}

impl RecordFilter<Project> for ProjectFilter {
    fn matches(&self, _record: &Project) -> bool {
        true
    }
}

impl RecordFilter<Milestone> for MilestoneFilter {
    fn matches(&self, record: &Milestone) -> bool {
        eq(&self.project_id, &record.project_id)
    }
}

impl RecordFilter<Issue> for IssueFilter {
    fn matches(&self, record: &Issue) -> bool {
        eq(&self.project_id, &record.project_id)
            && self
                .milestone_id
                .map_or(true, |m| record.milestone_id == Some(m))
            && eq(&self.status, &record.status)
            && eq(&self.priority, &record.priority)
    }
}

impl RecordFilter<Schedule> for ScheduleFilter {
    fn matches(&self, record: &Schedule) -> bool {
        eq(&self.project_id, &record.project_id)
            && self.start_date.map_or(true, |from| record.start_date >= from)
            && self.end_date.map_or(true, |until| record.end_date <= until)
    }
}

/// Filter `records` and return the matches in the entity's default order.
pub fn select<E: Entity>(records: &[E], filter: &E::Filter) -> Vec<E> {
    let mut selected: Vec<E> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
    selected.sort_by(E::default_order);
    selected
}
