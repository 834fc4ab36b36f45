use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	model::{self, Role},
	session, Database, Error,
};

/// A resolved identity: the session token, the live user row it references,
/// and the role computed from the bootstrap id at resolution time.
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: model::User,
	pub role: Role,
}

/// Extracts the session from the request if one resolves.
///
/// Any break in the chain from cookie to user row (no cookie, unparsable
/// token, unknown session, deleted user) yields an anonymous request rather
/// than a rejection.
#[derive(Debug)]
pub struct OptionalSession(pub Option<Session>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let cookies = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok());

		let Some(session_id) = cookies
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == session::COOKIE_NAME)
		else {
			return Ok(Self(None));
		};

		let Ok(session_id) = Uuid::parse_str(session_id.value()) else {
			return Ok(Self(None));
		};

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, model::User>(
			"SELECT * FROM users WHERE id = (SELECT user_id FROM sessions WHERE id = ?)",
		)
		.bind(session_id.to_string())
		.fetch_optional(&database)
		.await?;

		Ok(Self(user.map(|user| Session {
			id: session_id,
			role: Role::of(&user),
			user,
		})))
	}
}

/// Extracts the session and related user from the request.
///
/// If the request is anonymous, the handler never runs and the visitor is
/// redirected to the login page.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		OptionalSession::from_request_parts(parts, state)
			.await?
			.0
			.ok_or(Error::LoginRequired)
	}
}

/// The admin-only guard, applied declaratively to every mutating route.
///
/// Rejects with a forbidden outcome before the handler body runs unless the
/// resolved identity is the administrator. With no users registered, nothing
/// resolves and every mutating action is forbidden.
#[derive(Debug)]
pub struct Admin(pub Session);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Admin
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session = OptionalSession::from_request_parts(parts, state)
			.await?
			.0
			.ok_or(Error::Forbidden)?;

		if session.role.is_admin() {
			Ok(Self(session))
		} else {
			Err(Error::Forbidden)
		}
	}
}
