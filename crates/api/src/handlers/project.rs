//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pms_core::models::{Project, ProjectPayload};
use pms_core::query::ProjectFilter;
use pms_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProjectPayload>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let input = payload.into_fields()?;
    let project = state.store.projects().create(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = state.store.projects().list(&ProjectFilter::default()).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Project>> {
    let project = state.store.projects().get(id).await?;
    Ok(Json(project))
}

/// PUT /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(payload): AppJson<ProjectPayload>,
) -> AppResult<Json<Project>> {
    let fields = payload.into_fields()?;
    let project = state.store.projects().update(id, fields).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
///
/// Milestones, issues and schedules of the project are removed with it.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.projects().delete(id).await?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
