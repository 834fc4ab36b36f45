use axum::{
	extract::State,
	http::header,
	response::{IntoResponse, Redirect},
	routing::get,
	Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;
use uuid::Uuid;
use validator::Validate;

use crate::{
	extract::{Flash, Form, OptionalSession},
	model, password, session, AppState, Database, Error,
};

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/register", get(register_page).post(register))
		.route("/login", get(login_page).post(login))
		.route("/logout", get(logout))
}

/// View model for the login and registration pages, carrying any pending
/// flash notice for the template to display.
#[derive(Debug, Serialize)]
pub struct FormPage {
	pub title: &'static str,
	pub notice: Option<&'static str>,
}

fn form_page(title: &'static str, flash: Flash) -> impl IntoResponse {
	(
		[(header::SET_COOKIE, session::clear_flash().to_string())],
		Json(FormPage {
			title,
			notice: flash.0.map(session::Notice::message),
		}),
	)
}

async fn register_page(flash: Flash) -> impl IntoResponse {
	form_page("Register", flash)
}

async fn login_page(flash: Flash) -> impl IntoResponse {
	form_page("Log In", flash)
}

#[derive(Deserialize, Validate)]
pub struct RegisterInput {
	#[validate(length(min = 1, max = 100))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

/// Opens a session for the user, returning the token that goes in the cookie.
async fn open_session<'e, E: SqliteExecutor<'e>>(db: E, user_id: i64) -> Result<Uuid, sqlx::Error> {
	let session_id = Uuid::new_v4();

	sqlx::query("INSERT INTO sessions (id, user_id) VALUES (?, ?)")
		.bind(session_id.to_string())
		.bind(user_id)
		.execute(db)
		.await?;

	Ok(session_id)
}

/// Registers a new account and logs it in.
///
/// A duplicate email writes nothing and redirects to the login page with a
/// flash notice instead.
async fn register(
	State(state): State<AppState>,
	Form(input): Form<RegisterInput>,
) -> Result<impl IntoResponse, Error> {
	let taken =
		sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
			.bind(&input.email)
			.fetch_one(&state.database)
			.await?;

	if taken {
		return Err(Error::DuplicateEmail);
	}

	let digest = password::hash(&state.hasher, &input.password)?;

	let mut tx = state.database.begin().await?;

	let user_id = sqlx::query_scalar::<_, i64>(
		"INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?) RETURNING id",
	)
	.bind(&input.email)
	.bind(&input.name)
	.bind(&digest)
	.fetch_one(&mut *tx)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.is_unique_violation() => Error::DuplicateEmail,
		e => Error::Database(e),
	})?;

	let session_id = open_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	Ok((
		[(
			header::SET_COOKIE,
			session::create_cookie(session_id).to_string(),
		)],
		Redirect::to("/"),
	))
}

/// Starts a session, assuming the credentials are valid.
async fn login(
	State(state): State<AppState>,
	Form(input): Form<LoginInput>,
) -> Result<impl IntoResponse, Error> {
	let user = sqlx::query_as::<_, model::User>("SELECT * FROM users WHERE email = ?")
		.bind(&input.email)
		.fetch_optional(&state.database)
		.await?;

	// An unknown email and a wrong password fail identically.
	let Some(user) = user else {
		return Err(Error::Auth);
	};

	if !password::verify(&state.hasher, &input.password, &user.password_hash) {
		return Err(Error::Auth);
	}

	let session_id = open_session(&state.database, user.id).await?;

	Ok((
		[(
			header::SET_COOKIE,
			session::create_cookie(session_id).to_string(),
		)],
		Redirect::to("/"),
	))
}

/// Ends the session, if one resolves, and clears the cookie either way.
async fn logout(
	State(database): State<Database>,
	session: OptionalSession,
) -> Result<impl IntoResponse, Error> {
	if let Some(session) = session.0 {
		sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(session.id.to_string())
			.execute(&database)
			.await?;
	}

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		Redirect::to("/"),
	))
}
