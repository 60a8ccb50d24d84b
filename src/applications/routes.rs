use axum::{Router, routing::get};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/applications",
        get(handler::list_applications).post(handler::create_application),
    )
}
