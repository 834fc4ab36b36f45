mod session;

pub use session::{Admin, OptionalSession, Session};

use axum::{
	extract::{FromRequest, FromRequestParts, Request},
	http::{header, request},
};
use serde::de;

use crate::{session::Notice, Error};

/// Extractor that deserializes a form body and validates it.
///
/// T must implement [`serde::de::DeserializeOwned`] and [`validator::Validate`]
/// in order to be used in an extractor.
///
/// ```rust
/// # use inkcap::extract::Form;
/// # use inkcap::route::auth::RegisterInput;
/// async fn route(Form(input): Form<RegisterInput>) {
///   // ...
/// }
/// ```
pub struct Form<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Form<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let result = axum::Form::<T>::from_request(req, state).await?.0;

		result.validate()?;
		Ok(Self(result))
	}
}

/// Extractor that pulls the pending flash notice out of the request, if any.
///
/// The notice is consumed by the page that renders it; handlers pair this
/// with [`crate::session::clear_flash`] on the response.
#[derive(Debug)]
pub struct Flash(pub Option<Notice>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Flash
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		let notice = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok())
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == crate::session::FLASH_COOKIE_NAME)
			.and_then(|cookie| Notice::from_code(cookie.value()));

		Ok(Self(notice))
	}
}
