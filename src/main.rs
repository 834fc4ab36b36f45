use std::str::FromStr;

use argon2::Argon2;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use inkcap::{Database, State};

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt::init();
	dotenvy::dotenv().ok();

	let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://posts.db".to_owned());

	let database: Database = SqlitePoolOptions::new()
		.connect_with(
			SqliteConnectOptions::from_str(&url)
				.expect("DATABASE_URL must be a valid sqlite url")
				.create_if_missing(true),
		)
		.await
		.expect("failed to connect to database");

	inkcap::MIGRATOR
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State {
		database,
		hasher: Argon2::default(),
	};

	let app = inkcap::router(state);

	let port = std::env::var("PORT").map_or_else(
		|_| 3000,
		|port| port.parse().expect("PORT must be a number"),
	);

	let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(listener, app).await.unwrap();
}
