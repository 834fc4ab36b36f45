use axum::{
	body::Body,
	extract::rejection,
	http::{header, Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use serde::Serialize;

use crate::session::{self, Notice};

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("form error: {0}")]
	Form(#[from] rejection::FormRejection),
	/// Bad login credentials. Deliberately silent on which field was wrong.
	#[error("invalid email or password")]
	Auth,
	#[error("email already registered")]
	DuplicateEmail,
	#[error("post title already taken")]
	DuplicateTitle,
	#[error("login required")]
	LoginRequired,
	#[error("not found")]
	NotFound,
	#[error("forbidden")]
	Forbidden,
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("password hash error: {0}")]
	Password(#[from] argon2::password_hash::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<String>,
}

/// Redirects to `to` with a flash notice for the next page render.
fn flash_redirect(notice: Notice, to: &str) -> Response<Body> {
	(
		[(header::SET_COOKIE, session::flash_cookie(notice).to_string())],
		Redirect::to(to),
	)
		.into_response()
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		match self {
			Error::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse {
					errors: errors
						.field_errors()
						.into_iter()
						.flat_map(move |(field, errors)| {
							errors
								.iter()
								.map(move |error| format!("{field}: {error}"))
								.collect::<Vec<_>>()
						})
						.collect(),
					success: false,
				}),
			)
				.into_response(),
			Error::Form(error) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse {
					errors: vec![error.to_string()],
					success: false,
				}),
			)
				.into_response(),
			Error::Auth => flash_redirect(Notice::InvalidCredentials, "/login"),
			Error::DuplicateEmail => flash_redirect(Notice::DuplicateEmail, "/login"),
			Error::DuplicateTitle => flash_redirect(Notice::DuplicateTitle, "/new-post"),
			Error::LoginRequired => flash_redirect(Notice::LoginRequired, "/login"),
			Error::NotFound => StatusCode::NOT_FOUND.into_response(),
			Error::Forbidden => StatusCode::FORBIDDEN.into_response(),
			Error::Database(..) | Error::Password(..) => {
				tracing::error!(error = %self, "internal error");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(ErrorResponse {
						errors: Vec::new(),
						success: false,
					}),
				)
					.into_response()
			}
		}
	}
}
