use std::sync::Arc;

use axum::{Json, extract::FromRequest};
use tracing::debug;

use crate::api::HealthResponse;
use crate::db::Database;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db: Arc::new(db) }
    }
}

/// `Json` whose rejections render through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

pub async fn healthcheck() -> Json<HealthResponse> {
    debug!("got healthcheck request");
    Json(HealthResponse { ok: true })
}
