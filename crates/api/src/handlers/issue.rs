//! Handlers for the `/issues` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pms_core::models::{Issue, IssuePayload};
use pms_core::query::IssueFilter;
use pms_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/issues
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<IssuePayload>,
) -> AppResult<(StatusCode, Json<Issue>)> {
    let input = payload.into_new()?;
    let issue = state.store.issues().create(input).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// GET /api/issues?project_id=&milestone_id=&status=&priority=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<IssueFilter>,
) -> AppResult<Json<Vec<Issue>>> {
    let issues = state.store.issues().list(&filter).await?;
    Ok(Json(issues))
}

/// GET /api/issues/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Issue>> {
    let issue = state.store.issues().get(id).await?;
    Ok(Json(issue))
}

/// PUT /api/issues/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(payload): AppJson<IssuePayload>,
) -> AppResult<Json<Issue>> {
    let fields = payload.into_fields()?;
    let issue = state.store.issues().update(id, fields).await?;
    Ok(Json(issue))
}

/// DELETE /api/issues/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.issues().delete(id).await?;
    Ok(Json(MessageResponse::new("Issue deleted successfully")))
}
