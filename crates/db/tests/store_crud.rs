//! Integration tests for the SQLite store.
//!
//! Exercises the persistence contract against a real database:
//! - Create and read back the full hierarchy
//! - Set-null and cascade behaviour on delete
//! - Dangling and cross-project references
//! - Filters and default ordering

use assert_matches::assert_matches;
use pms_core::error::CoreError;
use pms_core::models::{
    Issue, IssueFields, MilestoneFields, NewIssue, NewMilestone, NewSchedule, ProjectFields,
    Schedule, ScheduleFields,
};
use pms_core::parse::{parse_date, parse_timestamp};
use pms_core::query::{IssueFilter, MilestoneFilter, ProjectFilter, ScheduleFilter};
use pms_core::store::Store;
use pms_core::types::{DbId, Timestamp};
use pms_db::SqlStore;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(raw: &str) -> Timestamp {
    parse_timestamp(raw).unwrap()
}

async fn seed_project(store: &SqlStore, name: &str) -> DbId {
    store
        .projects()
        .create(ProjectFields::named(name))
        .await
        .unwrap()
        .id
}

async fn seed_milestone(store: &SqlStore, project_id: DbId, title: &str) -> DbId {
    store
        .milestones()
        .create(NewMilestone {
            project_id,
            fields: MilestoneFields::titled(title),
        })
        .await
        .unwrap()
        .id
}

async fn seed_issue(store: &SqlStore, project_id: DbId, milestone_id: Option<DbId>) -> Issue {
    store
        .issues()
        .create(NewIssue {
            project_id,
            fields: IssueFields {
                milestone_id,
                ..IssueFields::titled("Login fails")
            },
        })
        .await
        .unwrap()
}

async fn seed_schedule(
    store: &SqlStore,
    project_id: DbId,
    issue_id: Option<DbId>,
    start: &str,
    end: &str,
) -> Schedule {
    store
        .schedules()
        .create(NewSchedule {
            project_id,
            fields: ScheduleFields {
                issue_id,
                ..ScheduleFields::spanning("Fix", ts(start), ts(end))
            },
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_hierarchy_assigns_first_ids(pool: SqlitePool) {
    let store = SqlStore::new(pool);

    let project = store
        .projects()
        .create(ProjectFields::named("Alpha"))
        .await
        .unwrap();
    assert_eq!(project.id, 1);
    assert_eq!(project.status, "active");
    assert_eq!(project.created_at, project.updated_at);

    let milestone_id = seed_milestone(&store, project.id, "v1").await;
    assert_eq!(milestone_id, 1);

    let issue = seed_issue(&store, project.id, Some(milestone_id)).await;
    assert_eq!(issue.id, 1);
    assert_eq!(issue.status, "open");
    assert_eq!(issue.priority, "medium");
    assert_eq!(issue.milestone_id, Some(1));

    let fetched = store.issues().get(issue.id).await.unwrap();
    assert_eq!(fetched, issue);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_milestone_due_date_round_trips(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;

    let milestone = store
        .milestones()
        .create(NewMilestone {
            project_id,
            fields: MilestoneFields {
                due_date: parse_date("2024-06-30"),
                ..MilestoneFields::titled("v1")
            },
        })
        .await
        .unwrap();

    let fetched = store.milestones().get(milestone.id).await.unwrap();
    assert_eq!(fetched.due_date, parse_date("2024-06-30"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_missing_is_not_found(pool: SqlitePool) {
    let store = SqlStore::new(pool);

    let err = store.projects().get(42).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Project", id: 42 });
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_replaces_fields_and_keeps_created_at(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project = store
        .projects()
        .create(ProjectFields::named("Alpha"))
        .await
        .unwrap();

    let updated = store
        .projects()
        .update(
            project.id,
            ProjectFields {
                description: Some("renamed".to_string()),
                status: "archived".to_string(),
                ..ProjectFields::named("Beta")
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, project.id);
    assert_eq!(updated.name, "Beta");
    assert_eq!(updated.status, "archived");
    assert_eq!(updated.created_at, project.created_at);
    assert!(updated.updated_at >= project.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_is_not_found(pool: SqlitePool) {
    let store = SqlStore::new(pool);

    let err = store
        .projects()
        .update(7, ProjectFields::named("Ghost"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { id: 7, .. });
}

#[sqlx::test(migrations = "./migrations")]
async fn test_issue_update_rejects_milestone_from_other_project(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let alpha = seed_project(&store, "Alpha").await;
    let beta = seed_project(&store, "Beta").await;
    let beta_milestone = seed_milestone(&store, beta, "b1").await;
    let issue = seed_issue(&store, alpha, None).await;

    let err = store
        .issues()
        .update(
            issue.id,
            IssueFields {
                milestone_id: Some(beta_milestone),
                ..IssueFields::titled("moved")
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let unchanged = store.issues().get(issue.id).await.unwrap();
    assert_eq!(unchanged, issue);
}

// ---------------------------------------------------------------------------
// Dangling references
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_with_missing_project_persists_nothing(pool: SqlitePool) {
    let store = SqlStore::new(pool);

    let err = store
        .milestones()
        .create(NewMilestone {
            project_id: 99,
            fields: MilestoneFields::titled("orphan"),
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(msg) if msg.contains("project_id 99"));

    let all = store
        .milestones()
        .list(&MilestoneFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_schedule_with_missing_issue_is_rejected(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;

    let err = store
        .schedules()
        .create(NewSchedule {
            project_id,
            fields: ScheduleFields {
                issue_id: Some(5),
                ..ScheduleFields::spanning(
                    "Fix",
                    ts("2024-01-01T09:00:00Z"),
                    ts("2024-01-01T17:00:00Z"),
                )
            },
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(msg) if msg.contains("issue_id 5"));
}

// ---------------------------------------------------------------------------
// Delete and referential actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_milestone_delete_unlinks_issues(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;
    let milestone_id = seed_milestone(&store, project_id, "v1").await;
    let issue = seed_issue(&store, project_id, Some(milestone_id)).await;

    store.milestones().delete(milestone_id).await.unwrap();

    let issue = store.issues().get(issue.id).await.unwrap();
    assert_eq!(issue.milestone_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_delete_cascades_everything(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let alpha = seed_project(&store, "Alpha").await;
    let beta = seed_project(&store, "Beta").await;
    let milestone_id = seed_milestone(&store, alpha, "v1").await;
    let issue = seed_issue(&store, alpha, Some(milestone_id)).await;
    seed_schedule(
        &store,
        alpha,
        Some(issue.id),
        "2024-01-01T09:00:00Z",
        "2024-01-02T09:00:00Z",
    )
    .await;
    let survivor = seed_issue(&store, beta, None).await;

    store.projects().delete(alpha).await.unwrap();

    assert!(store
        .milestones()
        .list(&MilestoneFilter::default())
        .await
        .unwrap()
        .is_empty());
    let issues = store.issues().list(&IssueFilter::default()).await.unwrap();
    assert_eq!(issues, vec![survivor]);
    assert!(store
        .schedules()
        .list(&ScheduleFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_issue_delete_cascades_schedules(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;
    let issue = seed_issue(&store, project_id, None).await;
    seed_schedule(
        &store,
        project_id,
        Some(issue.id),
        "2024-01-01T09:00:00Z",
        "2024-01-01T17:00:00Z",
    )
    .await;
    let standalone = seed_schedule(
        &store,
        project_id,
        None,
        "2024-02-01T09:00:00Z",
        "2024-02-01T17:00:00Z",
    )
    .await;

    store.issues().delete(issue.id).await.unwrap();

    let remaining = store
        .schedules()
        .list(&ScheduleFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining, vec![standalone]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_twice_is_not_found(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;

    store.projects().delete(project_id).await.unwrap();
    let err = store.projects().delete(project_id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

// ---------------------------------------------------------------------------
// Filters and ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_issue_filters_combine(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;
    let open = seed_issue(&store, project_id, None).await;
    let closed = store
        .issues()
        .create(NewIssue {
            project_id,
            fields: IssueFields {
                status: "closed".to_string(),
                priority: "high".to_string(),
                ..IssueFields::titled("Done")
            },
        })
        .await
        .unwrap();

    let filter = IssueFilter {
        status: Some("closed".to_string()),
        ..IssueFilter::default()
    };
    assert_eq!(store.issues().list(&filter).await.unwrap(), vec![closed.clone()]);

    let filter = IssueFilter {
        project_id: Some(project_id),
        priority: Some("medium".to_string()),
        ..IssueFilter::default()
    };
    assert_eq!(store.issues().list(&filter).await.unwrap(), vec![open.clone()]);

    // Newest first.
    let all = store.issues().list(&IssueFilter::default()).await.unwrap();
    assert_eq!(all, vec![closed, open]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_projects_listed_newest_first(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let first = seed_project(&store, "First").await;
    let second = seed_project(&store, "Second").await;

    let ids: Vec<DbId> = store
        .projects()
        .list(&ProjectFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_schedule_date_window_is_inclusive(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;
    let late = seed_schedule(
        &store,
        project_id,
        None,
        "2024-03-01T00:00:00Z",
        "2024-03-05T00:00:00Z",
    )
    .await;
    let early = seed_schedule(
        &store,
        project_id,
        None,
        "2024-01-01T00:00:00Z",
        "2024-01-31T00:00:00Z",
    )
    .await;

    let all = store
        .schedules()
        .list(&ScheduleFilter::default())
        .await
        .unwrap();
    assert_eq!(all, vec![early.clone(), late.clone()]);

    let window = ScheduleFilter {
        start_date: Some(ts("2024-01-01T00:00:00Z")),
        end_date: Some(ts("2024-01-31T00:00:00Z")),
        ..ScheduleFilter::default()
    };
    assert_eq!(store.schedules().list(&window).await.unwrap(), vec![early]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_milestones_without_due_date_sort_first(pool: SqlitePool) {
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Alpha").await;
    let dated = store
        .milestones()
        .create(NewMilestone {
            project_id,
            fields: MilestoneFields {
                due_date: parse_date("2024-05-01"),
                ..MilestoneFields::titled("dated")
            },
        })
        .await
        .unwrap();
    let undated = seed_milestone(&store, project_id, "someday").await;

    let ids: Vec<DbId> = store
        .milestones()
        .list(&MilestoneFilter {
            project_id: Some(project_id),
        })
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![undated, dated.id]);
}

// ---------------------------------------------------------------------------
// Concurrent writers
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checked_creates_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("pms.db").display());
    let pool = pms_db::create_pool(&url, 5).await.unwrap();
    pms_db::run_migrations(&pool).await.unwrap();
    let store = SqlStore::new(pool);
    let project_id = seed_project(&store, "Busy").await;

    let mut tasks = Vec::new();
    for n in 0..50 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .issues()
                .create(NewIssue {
                    project_id,
                    fields: IssueFields::titled(format!("issue {n}")),
                })
                .await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);

    let listed = store.issues().list(&IssueFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 50);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check_and_backend_name(pool: SqlitePool) {
    let store = SqlStore::new(pool);

    assert_eq!(store.backend_name(), "sqlite");
    store.health_check().await.unwrap();
}
