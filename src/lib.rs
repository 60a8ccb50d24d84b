use axum::{Router, http::Method, routing::get};
use std::error::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handler::{AppState, healthcheck};

pub mod api;
pub mod applications;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;

/// Builds the service router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(healthcheck))
        .merge(applications::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_error_joins_sources() {
        let err = anyhow::anyhow!("database is locked").context("failed to create application");
        assert_eq!(unpack_error(&*err), "failed to create application: database is locked");
    }
}
