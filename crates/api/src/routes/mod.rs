pub mod health;
pub mod issue;
pub mod milestone;
pub mod project;
pub mod schedule;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                 list, create
/// /projects/{id}            get, update, delete (cascades to children)
///
/// /milestones               list (?project_id), create
/// /milestones/{id}          get, update, delete (unlinks issues)
///
/// /issues                   list (?project_id, milestone_id, status, priority), create
/// /issues/{id}              get, update, delete (cascades to schedules)
///
/// /schedules                list (?project_id, start_date, end_date), create
/// /schedules/{id}           get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/milestones", milestone::router())
        .nest("/issues", issue::router())
        .nest("/schedules", schedule::router())
}
