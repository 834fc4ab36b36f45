use argon2::Argon2;
use axum::http::{header, StatusCode};
use axum_test::{TestResponse, TestServer, TestServerConfig};
use sqlx::sqlite::SqlitePoolOptions;

use inkcap::{Database, State};

/// Boots the app against a fresh in-memory database.
///
/// The pool is pinned to a single connection so every request sees the same
/// in-memory store.
async fn setup() -> (TestServer, Database) {
	let database = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await
		.unwrap();

	inkcap::MIGRATOR.run(&database).await.unwrap();

	let server = TestServer::new_with_config(
		inkcap::router(State {
			database: database.clone(),
			hasher: Argon2::default(),
		}),
		TestServerConfig {
			save_cookies: true,
			..TestServerConfig::default()
		},
	)
	.unwrap();

	(server, database)
}

async fn register(server: &TestServer, name: &str, email: &str, password: &str) -> TestResponse {
	server
		.post("/register")
		.form(&[("name", name), ("email", email), ("password", password)])
		.await
}

async fn login(server: &TestServer, email: &str, password: &str) -> TestResponse {
	server
		.post("/login")
		.form(&[("email", email), ("password", password)])
		.await
}

async fn create_post(server: &TestServer, title: &str) -> TestResponse {
	server
		.post("/new-post")
		.form(&[
			("title", title),
			("subtitle", "A subtitle"),
			("body", "<p>Some body text.</p>"),
			("img_url", "https://example.com/header.png"),
		])
		.await
}

async fn count(database: &Database, sql: &str) -> i64 {
	sqlx::query_scalar(sql).fetch_one(database).await.unwrap()
}

#[tokio::test]
async fn test_duplicate_registration_writes_nothing() {
	let (server, database) = setup().await;

	let response = register(&server, "Alice", "a@x.com", "pw1").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/");

	let response = register(&server, "Someone Else", "a@x.com", "pw2").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/login");
	assert_eq!(response.cookie("flash").value(), "duplicate-email");

	assert_eq!(count(&database, "SELECT COUNT(*) FROM users").await, 1);
}

#[tokio::test]
async fn test_register_login_round_trip() {
	let (server, database) = setup().await;

	register(&server, "Alice", "a@x.com", "pw1").await;
	server.get("/logout").await.assert_status(StatusCode::SEE_OTHER);

	let response = login(&server, "a@x.com", "pw1").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/");

	server.get("/logout").await.assert_status(StatusCode::SEE_OTHER);

	// Wrong password: same generic outcome as an unknown email.
	let response = login(&server, "a@x.com", "wrong").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/login");
	assert_eq!(response.cookie("flash").value(), "invalid-credentials");

	let response = login(&server, "nobody@x.com", "pw1").await;
	assert_eq!(response.cookie("flash").value(), "invalid-credentials");

	let page: serde_json::Value = server.get("/login").await.json();
	assert_eq!(page["notice"], "Invalid email or password.");

	assert_eq!(count(&database, "SELECT COUNT(*) FROM users").await, 1);
}

#[tokio::test]
async fn test_mutations_forbidden_for_non_admin() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await.assert_status(StatusCode::SEE_OTHER);
	server.get("/logout").await;

	// Second account is not the administrator.
	register(&server, "Bob", "bob@x.com", "password").await;

	create_post(&server, "T2").await.assert_status(StatusCode::FORBIDDEN);
	server
		.post("/edit-post/1")
		.form(&[
			("title", "Changed"),
			("subtitle", "Changed"),
			("body", "Changed"),
			("img_url", "https://example.com/x.png"),
		])
		.await
		.assert_status(StatusCode::FORBIDDEN);
	server.get("/delete/1").await.assert_status(StatusCode::FORBIDDEN);
	server
		.get("/delete-comment/1")
		.await
		.assert_status(StatusCode::FORBIDDEN);
	server.get("/new-post").await.assert_status(StatusCode::FORBIDDEN);

	// Store unchanged.
	assert_eq!(count(&database, "SELECT COUNT(*) FROM posts").await, 1);
	let title: String = sqlx::query_scalar("SELECT title FROM posts WHERE id = 1")
		.fetch_one(&database)
		.await
		.unwrap();
	assert_eq!(title, "T1");

	// Anonymous requests are forbidden too.
	server.get("/logout").await;
	create_post(&server, "T3").await.assert_status(StatusCode::FORBIDDEN);
	server.get("/delete/1").await.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_post_cascades_to_comments() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;

	for text in ["first", "second", "third"] {
		server
			.post("/post/1")
			.form(&[("text", text)])
			.await
			.assert_status(StatusCode::SEE_OTHER);
	}

	assert_eq!(count(&database, "SELECT COUNT(*) FROM comments").await, 3);

	let response = server.get("/delete/1").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/");

	assert_eq!(
		count(&database, "SELECT COUNT(*) FROM comments WHERE post_id = 1").await,
		0
	);
	assert_eq!(count(&database, "SELECT COUNT(*) FROM posts").await, 0);
}

#[tokio::test]
async fn test_anonymous_comment_writes_nothing() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;
	server.get("/logout").await;

	let response = server.post("/post/1").form(&[("text", "hello")]).await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/login");
	assert_eq!(response.cookie("flash").value(), "login-required");

	assert_eq!(count(&database, "SELECT COUNT(*) FROM comments").await, 0);
}

#[tokio::test]
async fn test_comments_append_in_order() {
	let (server, _database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;

	server.post("/post/1").form(&[("text", "First!")]).await;
	server.post("/post/1").form(&[("text", "Second.")]).await;

	let page: serde_json::Value = server.get("/post/1").await.json();
	let comments = page["comments"].as_array().unwrap();

	assert_eq!(comments.len(), 2);
	assert_eq!(comments[0]["text"], "First!");
	assert_eq!(comments[1]["text"], "Second.");
	assert_eq!(comments[0]["author"], "Admin");
	assert!(comments[0]["avatar_url"]
		.as_str()
		.unwrap()
		.starts_with("https://www.gravatar.com/avatar/"));
}

#[tokio::test]
async fn test_edit_reassigns_author_and_keeps_date() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;
	server.get("/logout").await;
	register(&server, "Bob", "bob@x.com", "password").await;
	server.get("/logout").await;

	// Hand the post to the second user so the edit provably reassigns it.
	sqlx::query("UPDATE posts SET author_id = 2 WHERE id = 1")
		.execute(&database)
		.await
		.unwrap();

	let date_before: String = sqlx::query_scalar("SELECT date FROM posts WHERE id = 1")
		.fetch_one(&database)
		.await
		.unwrap();

	login(&server, "admin@x.com", "password").await;
	let response = server
		.post("/edit-post/1")
		.form(&[
			("title", "T1"),
			("subtitle", "Rewritten"),
			("body", "<p>New body.</p>"),
			("img_url", "https://example.com/new.png"),
		])
		.await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/post/1");

	let (title, date, author_id, subtitle): (String, String, i64, String) =
		sqlx::query_as("SELECT title, date, author_id, subtitle FROM posts WHERE id = 1")
			.fetch_one(&database)
			.await
			.unwrap();

	assert_eq!(title, "T1");
	assert_eq!(date, date_before);
	assert_eq!(author_id, 1);
	assert_eq!(subtitle, "Rewritten");
}

#[tokio::test]
async fn test_duplicate_title_rejected() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;

	let response = create_post(&server, "T1").await;
	response.assert_status(StatusCode::SEE_OTHER);
	assert_eq!(response.header(header::LOCATION), "/new-post");
	assert_eq!(response.cookie("flash").value(), "duplicate-title");

	assert_eq!(count(&database, "SELECT COUNT(*) FROM posts").await, 1);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
	let (server, _database) = setup().await;

	server.get("/post/99").await.assert_status(StatusCode::NOT_FOUND);

	register(&server, "Admin", "admin@x.com", "password").await;

	server
		.get("/edit-post/99")
		.await
		.assert_status(StatusCode::NOT_FOUND);
	server.get("/delete/99").await.assert_status(StatusCode::NOT_FOUND);
	server
		.get("/delete-comment/99")
		.await
		.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stale_session_falls_back_to_anonymous() {
	let (server, database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;

	// Invalidate the saved session server-side; the stale cookie must not
	// error, just resolve to an anonymous visitor.
	sqlx::query("DELETE FROM sessions")
		.execute(&database)
		.await
		.unwrap();

	let page: serde_json::Value = server.get("/").await.json();
	assert!(page["viewer"].is_null());

	create_post(&server, "T1").await.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_form_validation() {
	let (server, database) = setup().await;

	register(&server, "Alice", "not-an-email", "pw1")
		.await
		.assert_status(StatusCode::BAD_REQUEST);
	assert_eq!(count(&database, "SELECT COUNT(*) FROM users").await, 0);

	register(&server, "Admin", "admin@x.com", "password").await;
	server
		.post("/new-post")
		.form(&[
			("title", "T1"),
			("subtitle", "sub"),
			("body", "body"),
			("img_url", "not a url"),
		])
		.await
		.assert_status(StatusCode::BAD_REQUEST);
	assert_eq!(count(&database, "SELECT COUNT(*) FROM posts").await, 0);
}

#[tokio::test]
async fn test_index_lists_posts_with_authors() {
	let (server, _database) = setup().await;

	register(&server, "Admin", "admin@x.com", "password").await;
	create_post(&server, "T1").await;
	create_post(&server, "T2").await;

	let page: serde_json::Value = server.get("/").await.json();
	let posts = page["posts"].as_array().unwrap();

	assert_eq!(posts.len(), 2);
	assert_eq!(posts[0]["title"], "T1");
	assert_eq!(posts[1]["title"], "T2");
	assert_eq!(posts[0]["author"], "Admin");
	assert_eq!(page["viewer"]["is_admin"], true);
}

#[tokio::test]
async fn test_static_pages() {
	let (server, _database) = setup().await;

	server.get("/about").await.assert_status_ok();
	server.get("/contact").await.assert_status_ok();
}
