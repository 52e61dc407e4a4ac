//! Handlers for the `/milestones` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pms_core::models::{Milestone, MilestonePayload};
use pms_core::query::MilestoneFilter;
use pms_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/milestones
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<MilestonePayload>,
) -> AppResult<(StatusCode, Json<Milestone>)> {
    let input = payload.into_new()?;
    let milestone = state.store.milestones().create(input).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// GET /api/milestones?project_id=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<MilestoneFilter>,
) -> AppResult<Json<Vec<Milestone>>> {
    let milestones = state.store.milestones().list(&filter).await?;
    Ok(Json(milestones))
}

/// GET /api/milestones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Milestone>> {
    Ok(Json(state.store.milestones().get(id).await?))
}

/// PUT /api/milestones/{id}
///
/// `project_id` in the body is ignored; a milestone never changes project.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(payload): AppJson<MilestonePayload>,
) -> AppResult<Json<Milestone>> {
    let fields = payload.into_fields()?;
    let milestone = state.store.milestones().update(id, fields).await?;
    Ok(Json(milestone))
}

/// DELETE /api/milestones/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.milestones().delete(id).await?;
    Ok(Json(MessageResponse::new("Milestone deleted successfully")))
}
