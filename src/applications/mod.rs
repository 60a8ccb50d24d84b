//! Applications Module
//!
//! Tracks job applications: one row per application in the `applications`
//! table, created through `POST /applications` and listed newest first
//! through `GET /applications`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jobtrack::applications;
//!
//! let app = Router::new()
//!     .merge(applications::routes())
//!     .with_state(app_state);
//!
//! // Use the store directly with a scoped connection
//! let conn = db.connect()?;
//! let created = applications::Tracker::new(&conn).create(input).await?;
//! ```

mod handler;
mod routes;
mod tracker;

pub use routes::routes;
pub use tracker::*;

/// Returns the migrations for the applications module.
///
/// They are applied in order by [`crate::db::Database::open`].
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "applications_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
