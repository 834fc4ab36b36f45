use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";
pub const FLASH_COOKIE_NAME: &str = "flash";

/// A one-time notice shown on the next rendered page.
///
/// The cookie carries a short code rather than the display text so the value
/// stays token-safe; the message is resolved at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notice {
	DuplicateEmail,
	InvalidCredentials,
	LoginRequired,
	DuplicateTitle,
}

impl Notice {
	#[must_use]
	pub fn code(self) -> &'static str {
		match self {
			Self::DuplicateEmail => "duplicate-email",
			Self::InvalidCredentials => "invalid-credentials",
			Self::LoginRequired => "login-required",
			Self::DuplicateTitle => "duplicate-title",
		}
	}

	#[must_use]
	pub fn from_code(code: &str) -> Option<Self> {
		match code {
			"duplicate-email" => Some(Self::DuplicateEmail),
			"invalid-credentials" => Some(Self::InvalidCredentials),
			"login-required" => Some(Self::LoginRequired),
			"duplicate-title" => Some(Self::DuplicateTitle),
			_ => None,
		}
	}

	/// The user-facing message for this notice.
	#[must_use]
	pub fn message(self) -> &'static str {
		match self {
			Self::DuplicateEmail => "You've already signed up with that email, log in instead!",
			Self::InvalidCredentials => "Invalid email or password.",
			Self::LoginRequired => "You need to login or register to comment.",
			Self::DuplicateTitle => "A post with that title already exists.",
		}
	}
}

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.http_only(true)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Creates a flash cookie carrying a notice for the next page view.
pub fn flash_cookie(notice: Notice) -> cookie::Cookie<'static> {
	cookie::Cookie::build((FLASH_COOKIE_NAME, notice.code()))
		.http_only(true)
		.path("/")
		.into()
}

/// Clears the flash cookie once its notice has been rendered.
pub fn clear_flash() -> cookie::Cookie<'static> {
	cookie::Cookie::build(FLASH_COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}
