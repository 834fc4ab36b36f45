use axum::{
	extract::{Path, State},
	http::header,
	response::{IntoResponse, Redirect, Response},
	routing::get,
	Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
	extract::{Admin, Flash, Form, OptionalSession},
	model, session, AppState, Database, Error,
};

use super::comments;

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/", get(index))
		.route("/post/:id", get(show).post(comments::create))
		.route("/new-post", get(new_post_page).post(new_post))
		.route("/edit-post/:id", get(edit_post_page).post(edit_post))
		.route("/delete/:id", get(delete_post))
}

/// What the layout needs to know about the current visitor.
#[derive(Debug, Serialize)]
pub struct Viewer {
	pub name: String,
	pub is_admin: bool,
}

impl From<crate::extract::Session> for Viewer {
	fn from(session: crate::extract::Session) -> Self {
		Self {
			name: session.user.name,
			is_admin: session.role.is_admin(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
	pub posts: Vec<model::PostView>,
	pub viewer: Option<Viewer>,
	pub notice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
	pub post: model::PostView,
	pub comments: Vec<model::CommentView>,
	pub viewer: Option<Viewer>,
	pub notice: Option<&'static str>,
}

/// View model for the post form, blank for a new post and prefilled when
/// editing.
#[derive(Debug, Default, Serialize)]
pub struct PostFormPage {
	pub title: String,
	pub subtitle: String,
	pub body: String,
	pub img_url: String,
	pub notice: Option<&'static str>,
}

#[derive(Deserialize, Validate)]
pub struct PostInput {
	#[validate(length(min = 1, max = 250))]
	pub title: String,
	#[validate(length(min = 1, max = 250))]
	pub subtitle: String,
	#[validate(length(min = 1))]
	pub body: String,
	#[validate(url)]
	pub img_url: String,
}

async fn fetch_post(database: &Database, post_id: i64) -> Result<model::PostView, Error> {
	let post = sqlx::query_as::<_, model::PostView>(
		"SELECT p.*, u.name AS author FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = ?",
	)
	.bind(post_id)
	.fetch_optional(database)
	.await?;

	post.ok_or(Error::NotFound)
}

/// Lists every post, oldest first.
async fn index(
	State(database): State<Database>,
	session: OptionalSession,
	flash: Flash,
) -> Result<impl IntoResponse, Error> {
	let posts = sqlx::query_as::<_, model::PostView>(
		"SELECT p.*, u.name AS author FROM posts p JOIN users u ON u.id = p.author_id ORDER BY p.id",
	)
	.fetch_all(&database)
	.await?;

	Ok((
		[(header::SET_COOKIE, session::clear_flash().to_string())],
		Json(IndexPage {
			posts,
			viewer: session.0.map(Viewer::from),
			notice: flash.0.map(session::Notice::message),
		}),
	))
}

/// Shows a single post with its comments in insertion order.
async fn show(
	State(database): State<Database>,
	Path(post_id): Path<i64>,
	session: OptionalSession,
	flash: Flash,
) -> Result<impl IntoResponse, Error> {
	let post = fetch_post(&database, post_id).await?;

	let comments = sqlx::query_as::<_, model::CommentView>(
		r"
		SELECT c.id, c.text, u.name AS author, u.email AS author_email
		FROM comments c JOIN users u ON u.id = c.author_id
		WHERE c.post_id = ?
		ORDER BY c.id
		",
	)
	.bind(post_id)
	.fetch_all(&database)
	.await?;

	Ok((
		[(header::SET_COOKIE, session::clear_flash().to_string())],
		Json(PostPage {
			post,
			comments,
			viewer: session.0.map(Viewer::from),
			notice: flash.0.map(session::Notice::message),
		}),
	))
}

async fn new_post_page(_admin: Admin, flash: Flash) -> impl IntoResponse {
	(
		[(header::SET_COOKIE, session::clear_flash().to_string())],
		Json(PostFormPage {
			notice: flash.0.map(session::Notice::message),
			..PostFormPage::default()
		}),
	)
}

/// Creates a post authored by the acting administrator.
///
/// The publication date is stamped here, as a display string, and never
/// touched again.
async fn new_post(
	State(database): State<Database>,
	admin: Admin,
	Form(input): Form<PostInput>,
) -> Result<impl IntoResponse, Error> {
	let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE title = ?)")
		.bind(&input.title)
		.fetch_one(&database)
		.await?;

	if taken {
		return Err(Error::DuplicateTitle);
	}

	let date = chrono::Local::now().format("%B %d, %Y").to_string();

	let post_id = sqlx::query_scalar::<_, i64>(
		r"
		INSERT INTO posts (title, subtitle, date, body, img_url, author_id)
		VALUES (?, ?, ?, ?, ?, ?)
		RETURNING id
		",
	)
	.bind(&input.title)
	.bind(&input.subtitle)
	.bind(&date)
	.bind(&input.body)
	.bind(&input.img_url)
	.bind(admin.0.user.id)
	.fetch_one(&database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.is_unique_violation() => Error::DuplicateTitle,
		e => Error::Database(e),
	})?;

	Ok(Redirect::to(&format!("/post/{post_id}")))
}

async fn edit_post_page(
	State(database): State<Database>,
	_admin: Admin,
	Path(post_id): Path<i64>,
	flash: Flash,
) -> Result<impl IntoResponse, Error> {
	let post = fetch_post(&database, post_id).await?;

	Ok((
		[(header::SET_COOKIE, session::clear_flash().to_string())],
		Json(PostFormPage {
			title: post.title,
			subtitle: post.subtitle,
			body: post.body,
			img_url: post.img_url,
			notice: flash.0.map(session::Notice::message),
		}),
	))
}

/// Overwrites a post's content and reassigns authorship to the editor.
/// The publication date is left as stamped at creation.
async fn edit_post(
	State(database): State<Database>,
	admin: Admin,
	Path(post_id): Path<i64>,
	Form(input): Form<PostInput>,
) -> Result<Response, Error> {
	fetch_post(&database, post_id).await?;

	let taken = sqlx::query_scalar::<_, bool>(
		"SELECT EXISTS(SELECT 1 FROM posts WHERE title = ? AND id != ?)",
	)
	.bind(&input.title)
	.bind(post_id)
	.fetch_one(&database)
	.await?;

	if taken {
		return Ok((
			[(
				header::SET_COOKIE,
				session::flash_cookie(session::Notice::DuplicateTitle).to_string(),
			)],
			Redirect::to(&format!("/edit-post/{post_id}")),
		)
			.into_response());
	}

	sqlx::query(
		r"
		UPDATE posts
		SET title = ?, subtitle = ?, body = ?, img_url = ?, author_id = ?
		WHERE id = ?
		",
	)
	.bind(&input.title)
	.bind(&input.subtitle)
	.bind(&input.body)
	.bind(&input.img_url)
	.bind(admin.0.user.id)
	.bind(post_id)
	.execute(&database)
	.await?;

	Ok(Redirect::to(&format!("/post/{post_id}")).into_response())
}

/// Deletes a post and its comments in one transaction.
async fn delete_post(
	State(database): State<Database>,
	_admin: Admin,
	Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
	let mut tx = database.begin().await?;

	sqlx::query("DELETE FROM comments WHERE post_id = ?")
		.bind(post_id)
		.execute(&mut *tx)
		.await?;

	let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
		.bind(post_id)
		.execute(&mut *tx)
		.await?;

	// Dropping the transaction without committing rolls the cascade back.
	if deleted.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	tx.commit().await?;

	Ok(Redirect::to("/"))
}
