//! Deterministic binding credentials derived from `(instance, host)` and a shared salt.
//!
//! Nothing is stored: the same pair always yields the same username and password, so binding is
//! idempotent by construction and unbinding only needs to recompute the username.
//!
//! The password is `hex(HMAC-SHA256(salt, len(instance) || instance || host))` where the length is
//! a big-endian `u64`. The prefix pins the boundary between the two inputs, so `("ab", "c")` and
//! `("a", "bc")` produce unrelated passwords.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// Number of instance-name characters kept in a derived username.
pub const USERNAME_INSTANCE_CHARS: usize = 20;
/// Number of host characters kept in a derived username.
pub const USERNAME_HOST_CHARS: usize = 20;
/// Number of password characters kept in a derived username.
pub const USERNAME_PASSWORD_CHARS: usize = 10;
/// Upper bound on the character count of a derived username.
pub const USERNAME_MAX_CHARS: usize =
	USERNAME_INSTANCE_CHARS + 1 + USERNAME_HOST_CHARS + 1 + USERNAME_PASSWORD_CHARS;

/// Username/password pair handed to a bound application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingCredentials {
	/// Derived RabbitMQ username.
	pub username: String,
	/// Derived RabbitMQ password.
	pub password: Secret,
}

/// Keyed derivation of binding credentials.
#[derive(Clone)]
pub struct CredentialDeriver {
	keyed: HmacSha256,
}
impl CredentialDeriver {
	/// Builds a deriver keyed with the shared salt.
	pub fn new(salt: &Secret) -> Result<Self, ConfigError> {
		let keyed = HmacSha256::new_from_slice(salt.expose().as_bytes())
			.map_err(|e| ConfigError::InvalidVar { name: "SALT", reason: e.to_string() })?;

		Ok(Self { keyed })
	}

	/// Derives the password for an `(instance, host)` pair.
	pub fn password(&self, instance: &str, host: &str) -> Secret {
		let mut mac = self.keyed.clone();

		mac.update(&(instance.len() as u64).to_be_bytes());
		mac.update(instance.as_bytes());
		mac.update(host.as_bytes());

		Secret::new(hex::encode(mac.finalize().into_bytes()))
	}

	/// Derives the username for an `(instance, host)` pair.
	pub fn username(&self, instance: &str, host: &str) -> String {
		self.username_with(instance, host, &self.password(instance, host))
	}

	/// Derives both halves of the binding credentials.
	pub fn derive(&self, instance: &str, host: &str) -> BindingCredentials {
		let password = self.password(instance, host);
		let username = self.username_with(instance, host, &password);

		BindingCredentials { username, password }
	}

	fn username_with(&self, instance: &str, host: &str, password: &Secret) -> String {
		format!(
			"{}_{}_{}",
			truncate_chars(instance, USERNAME_INSTANCE_CHARS),
			truncate_chars(host, USERNAME_HOST_CHARS),
			truncate_chars(password.expose(), USERNAME_PASSWORD_CHARS),
		)
	}
}
impl Debug for CredentialDeriver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CredentialDeriver(..)")
	}
}

fn truncate_chars(value: &str, max: usize) -> &str {
	match value.char_indices().nth(max) {
		Some((idx, _)) => &value[..idx],
		None => value,
	}
}
