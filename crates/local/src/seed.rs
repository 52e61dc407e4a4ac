//! Illustrative records written on first access to an empty local store.

use chrono::Duration;
use pms_core::integrity::Dataset;
use pms_core::models::{
    Issue, IssueFields, Milestone, MilestoneFields, NewIssue, NewMilestone, NewSchedule, Project,
    ProjectFields, Schedule, ScheduleFields,
};
use pms_core::types::Timestamp;

/// One linked record per collection, all with id 1.
pub fn seed_dataset(now: Timestamp) -> Dataset {
    let project = Project::create(
        1,
        ProjectFields {
            description: Some("An example project to get started with".to_string()),
            ..ProjectFields::named("Sample Project")
        },
        now,
    );

    let milestone = Milestone::create(
        1,
        NewMilestone {
            project_id: project.id,
            fields: MilestoneFields {
                description: Some("Initial feature set".to_string()),
                due_date: Some((now + Duration::days(30)).date_naive()),
                ..MilestoneFields::titled("First Release")
            },
        },
        now,
    );

    let issue = Issue::create(
        1,
        NewIssue {
            project_id: project.id,
            fields: IssueFields {
                milestone_id: Some(milestone.id),
                description: Some("Install the toolchain and run the app locally".to_string()),
                priority: "high".to_string(),
                ..IssueFields::titled("Set up the development environment")
            },
        },
        now,
    );

    let schedule = Schedule::create(
        1,
        NewSchedule {
            project_id: project.id,
            fields: ScheduleFields {
                issue_id: Some(issue.id),
                ..ScheduleFields::spanning("Environment setup", now, now + Duration::days(7))
            },
        },
        now,
    );

    Dataset {
        projects: vec![project],
        milestones: vec![milestone],
        issues: vec![issue],
        schedules: vec![schedule],
    }
}
