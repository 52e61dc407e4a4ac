//! Handlers for the `/schedules` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pms_core::models::{Schedule, SchedulePayload};
use pms_core::query::ScheduleFilter;
use pms_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/schedules
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SchedulePayload>,
) -> AppResult<(StatusCode, Json<Schedule>)> {
    let input = payload.into_new()?;
    let schedule = state.store.schedules().create(input).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /api/schedules?project_id=&start_date=&end_date=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ScheduleFilter>,
) -> AppResult<Json<Vec<Schedule>>> {
    let schedules = state.store.schedules().list(&filter).await?;
    Ok(Json(schedules))
}

/// GET /api/schedules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Schedule>> {
    let schedule = state.store.schedules().get(id).await?;
    Ok(Json(schedule))
}

/// PUT /api/schedules/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(payload): AppJson<SchedulePayload>,
) -> AppResult<Json<Schedule>> {
    let fields = payload.into_fields()?;
    let schedule = state.store.schedules().update(id, fields).await?;
    Ok(Json(schedule))
}

/// DELETE /api/schedules/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.schedules().delete(id).await?;
    Ok(Json(MessageResponse::new("Schedule deleted successfully")))
}
