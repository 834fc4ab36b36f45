use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};

/// Hashes a plaintext password with Argon2 and a freshly generated salt,
/// producing a PHC-format digest.
///
/// Two calls with the same plaintext yield different digests.
pub fn hash(hasher: &Argon2, plaintext: &str) -> Result<String, argon2::password_hash::Error> {
	let salt = SaltString::generate(&mut OsRng);

	Ok(hasher
		.hash_password(plaintext.as_bytes(), &salt)?
		.to_string())
}

/// Verifies a plaintext password against a stored digest.
///
/// A malformed or foreign digest verifies as `false` rather than erroring,
/// so a corrupt row can never take down a login request.
#[must_use]
pub fn verify(hasher: &Argon2, plaintext: &str, digest: &str) -> bool {
	PasswordHash::new(digest)
		.map_or(false, |parsed| {
			hasher.verify_password(plaintext.as_bytes(), &parsed).is_ok()
		})
}
