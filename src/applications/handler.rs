//! HTTP Handlers for the Applications API

use axum::{Json, extract::State};

use super::{Application, CreatedApplication, NewApplication, Tracker};
use crate::error::ApiResult;
use crate::handler::{AppState, JsonBody};

pub async fn create_application(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewApplication>,
) -> ApiResult<Json<CreatedApplication>> {
    let conn = state.db.connect()?;
    let created = Tracker::new(&conn).create(payload).await?;

    tracing::info!(id = created.id, company = %created.company, "created application");
    Ok(Json(created))
}

pub async fn list_applications(State(state): State<AppState>) -> ApiResult<Json<Vec<Application>>> {
    let conn = state.db.connect()?;
    let applications = Tracker::new(&conn).list().await?;

    tracing::debug!(count = applications.len(), "listed applications");
    Ok(Json(applications))
}
