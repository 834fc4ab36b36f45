use axum::{
	extract::{Path, State},
	response::{IntoResponse, Redirect},
	routing::get,
	Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
	extract::{Admin, Form, Session},
	AppState, Database, Error,
};

pub fn routes() -> Router<AppState> {
	Router::new().route("/delete-comment/:id", get(delete_comment))
}

#[derive(Deserialize, Validate)]
pub struct CommentInput {
	#[validate(length(min = 1))]
	pub text: String,
}

/// Appends a comment to a post as the logged-in user.
///
/// Anonymous submissions are redirected to the login page with a prompt and
/// write nothing. Registered under `POST /post/:id` alongside the post view.
pub async fn create(
	State(database): State<Database>,
	session: Session,
	Path(post_id): Path<i64>,
	Form(input): Form<CommentInput>,
) -> Result<impl IntoResponse, Error> {
	let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)")
		.bind(post_id)
		.fetch_one(&database)
		.await?;

	if !exists {
		return Err(Error::NotFound);
	}

	sqlx::query("INSERT INTO comments (text, author_id, post_id) VALUES (?, ?, ?)")
		.bind(&input.text)
		.bind(session.user.id)
		.bind(post_id)
		.execute(&database)
		.await?;

	Ok(Redirect::to(&format!("/post/{post_id}")))
}

/// Deletes a single comment, returning to its parent post.
async fn delete_comment(
	State(database): State<Database>,
	_admin: Admin,
	Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
	let post_id = sqlx::query_scalar::<_, i64>("SELECT post_id FROM comments WHERE id = ?")
		.bind(comment_id)
		.fetch_optional(&database)
		.await?
		.ok_or(Error::NotFound)?;

	sqlx::query("DELETE FROM comments WHERE id = ?")
		.bind(comment_id)
		.execute(&database)
		.await?;

	Ok(Redirect::to(&format!("/post/{post_id}")))
}
