#![warn(clippy::pedantic)]

pub mod error;
pub mod extract;
pub mod model;
pub mod password;
pub mod route;
pub mod session;

use argon2::Argon2;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::Error;

pub type Database = sqlx::SqlitePool;
pub type AppState = State;

/// Applies the schema. Shared between the binary and the test suite so both
/// always run against the same migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool or a hash configuration (if it's
/// expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
}

/// Builds the full application router with request tracing attached.
pub fn router(state: State) -> Router {
	route::routes()
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
