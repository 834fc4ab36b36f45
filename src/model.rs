use serde::Serialize;
use sha2::{Digest, Sha256};

/// The bootstrap identity: the first registered account administers the blog.
pub const ADMIN_USER_ID: i64 = 1;

/// A model representing a single user.
///
/// Use this when fetching from the database and returning to the client.
/// The `email` and `password_hash` fields are not serialized to the client.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	#[serde(skip_serializing)]
	pub email: String,
	pub name: String,
	/// Argon2 PHC string, never the plaintext
	#[serde(skip_serializing)]
	pub password_hash: String,
}

/// The access level of an authenticated user.
///
/// Derived from the bootstrap id when the identity is resolved, not stored
/// as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	Member,
}

impl Role {
	#[must_use]
	pub fn of(user: &User) -> Self {
		if user.id == ADMIN_USER_ID {
			Self::Admin
		} else {
			Self::Member
		}
	}

	#[must_use]
	pub fn is_admin(self) -> bool {
		matches!(self, Self::Admin)
	}
}

/// A model representing a single blog post.
///
/// The `date` column holds the display string stamped at creation; edits
/// never touch it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub title: String,
	pub subtitle: String,
	pub date: String,
	pub body: String,
	pub img_url: String,
	pub author_id: i64,
}

/// A model representing a single comment on a post.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub text: String,
	pub author_id: i64,
	pub post_id: i64,
}

/// A post row joined with its author's display name, as shown on the index
/// and post pages.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostView {
	pub id: i64,
	pub title: String,
	pub subtitle: String,
	pub date: String,
	pub body: String,
	pub img_url: String,
	pub author_id: i64,
	pub author: String,
}

/// A comment row joined with its author's name and avatar, in the shape the
/// post template consumes.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentView {
	pub id: i64,
	pub text: String,
	pub author: String,
	#[serde(serialize_with = "avatar", rename = "avatar_url")]
	pub author_email: String,
}

fn avatar<S: serde::Serializer>(email: &str, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&avatar_url(email))
}

/// Builds the avatar image URL for a commenter, keyed by their email.
///
/// Gravatar addresses images by the SHA-256 of the trimmed, lowercased email.
#[must_use]
pub fn avatar_url(email: &str) -> String {
	let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());

	format!(
		"https://www.gravatar.com/avatar/{}?d=retro&s=100",
		hex::encode(digest)
	)
}

#[cfg(test)]
mod test {
	use super::{avatar_url, Role, User};

	fn user(id: i64) -> User {
		User {
			id,
			email: "a@x.com".to_owned(),
			name: "A".to_owned(),
			password_hash: String::new(),
		}
	}

	#[test]
	fn test_first_user_is_admin() {
		assert_eq!(Role::of(&user(1)), Role::Admin);
		assert_eq!(Role::of(&user(2)), Role::Member);
		assert!(Role::Admin.is_admin());
		assert!(!Role::Member.is_admin());
	}

	#[test]
	fn test_avatar_url_normalizes_email() {
		assert_eq!(avatar_url(" A@X.com "), avatar_url("a@x.com"));
		assert!(avatar_url("a@x.com").starts_with("https://www.gravatar.com/avatar/"));
	}
}
