//! HTTP Basic-auth gate for the protected resource routes.

// crates.io
use axum::{
	extract::{Request, State},
	http::{
		HeaderValue, StatusCode,
		header::{AUTHORIZATION, WWW_AUTHENTICATE},
	},
	middleware::Next,
	response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{api::AppState, config::GateCredentials};

/// Challenge advertised on every rejected request.
pub const CHALLENGE: &str = r#"Basic realm="Login Required""#;
/// Body of every rejected request.
pub const CHALLENGE_BODY: &str = "Login Required";

/// Middleware rejecting requests whose Basic credentials do not match the configured pair.
pub async fn require_basic_auth(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Response {
	let authorized = request
		.headers()
		.get(AUTHORIZATION)
		.and_then(parse_basic)
		.is_some_and(|(username, password)| matches(&state.gate, &username, &password));

	if !authorized {
		tracing::debug!(uri = %request.uri(), "rejected unauthenticated request");

		return challenge();
	}

	next.run(request).await
}

/// Builds the 401 response carrying the Basic challenge.
pub fn challenge() -> Response {
	(StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, CHALLENGE)], CHALLENGE_BODY).into_response()
}

/// Decodes an `Authorization: Basic …` header into its username and password.
///
/// The password keeps every character after the first `:`.
pub fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
	let value = value.to_str().ok()?;
	let (scheme, encoded) = value.trim().split_once(' ')?;

	if !scheme.eq_ignore_ascii_case("basic") {
		return None;
	}

	let decoded = STANDARD.decode(encoded.trim()).ok()?;
	let decoded = String::from_utf8(decoded).ok()?;
	let (username, password) = decoded.split_once(':')?;

	Some((username.to_owned(), password.to_owned()))
}

fn matches(expected: &GateCredentials, username: &str, password: &str) -> bool {
	// Both comparisons always run.
	let username_ok = constant_time_eq(username.as_bytes(), expected.username.as_bytes());
	let password_ok = constant_time_eq(password.as_bytes(), expected.password.expose().as_bytes());

	username_ok & password_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	let mut diff = 0_u8;

	for (left, right) in a.iter().zip(b) {
		diff |= left ^ right;
	}

	diff == 0
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn header(raw: &str) -> HeaderValue {
		HeaderValue::from_str(raw).expect("Test header should be valid.")
	}

	fn basic(username: &str, password: &str) -> HeaderValue {
		header(&format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))))
	}

	#[test]
	fn parse_basic_decodes_credentials() {
		assert_eq!(parse_basic(&basic("foo", "bar")), Some(("foo".into(), "bar".into())));
		assert_eq!(parse_basic(&basic("foo", "b:a:r")), Some(("foo".into(), "b:a:r".into())));
		assert_eq!(parse_basic(&basic("", "")), Some((String::new(), String::new())));
	}

	#[test]
	fn parse_basic_rejects_other_shapes() {
		assert_eq!(parse_basic(&header("Bearer abc")), None);
		assert_eq!(parse_basic(&header("Basic !!!")), None);
		assert_eq!(parse_basic(&header(&format!("Basic {}", STANDARD.encode("nocolon")))), None);
		assert_eq!(parse_basic(&header("Basic")), None);
	}

	#[test]
	fn scheme_is_case_insensitive() {
		let value = header(&format!("basic {}", STANDARD.encode("foo:bar")));

		assert_eq!(parse_basic(&value), Some(("foo".into(), "bar".into())));
	}

	#[test]
	fn matches_requires_both_fields() {
		let gate = GateCredentials::new("foo", "bar");

		assert!(matches(&gate, "foo", "bar"));
		assert!(!matches(&gate, "foo", "baz"));
		assert!(!matches(&gate, "fop", "bar"));
		assert!(!matches(&gate, "foo", "barr"));
	}

	#[test]
	fn challenge_carries_realm() {
		let response = challenge();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.headers().get(WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
			Some(CHALLENGE)
		);
	}
}
