//! Helpers shared by the integration suites.

#![allow(dead_code)]

// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, header},
	response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::MockServer;
// self
use rabbitmq_broker::{
	api::{self, AppState},
	auth::{CredentialDeriver, Secret},
	config::{BrokerConfig, GateCredentials, ManagementConfig},
};

pub const GATE_USER: &str = "foo";
pub const GATE_PASSWORD: &str = "bar";
pub const MGMT_USER: &str = "admin";
pub const MGMT_PASSWORD: &str = "admin-secret";
pub const AMQP_PORT: u16 = 5672;
pub const SALT: &str = "integration-salt";

/// Configuration pointing the management client at `server`.
pub fn config(server: &MockServer) -> BrokerConfig {
	BrokerConfig::new(
		GateCredentials::new(GATE_USER, GATE_PASSWORD),
		ManagementConfig::new(server.host(), server.port(), MGMT_USER, MGMT_PASSWORD),
		AMQP_PORT,
		SALT,
	)
}

/// Full router wired to a reqwest-backed broker talking to `server`.
pub fn router(server: &MockServer) -> Router {
	let state =
		AppState::from_config(&config(server)).expect("Broker state should build for tests.");

	api::build_router(state)
}

/// Deriver keyed with the test salt.
pub fn deriver() -> CredentialDeriver {
	CredentialDeriver::new(&Secret::from(SALT)).expect("Test salt should key the deriver.")
}

/// `Authorization` value for a Basic credential pair.
pub fn basic(username: &str, password: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// `Authorization` value the management API expects from the broker.
pub fn management_auth() -> String {
	basic(MGMT_USER, MGMT_PASSWORD)
}

/// Authenticated request with an optional urlencoded form body.
pub fn request(method: &str, uri: &str, form: Option<&str>) -> Request<Body> {
	let builder = Request::builder()
		.method(method)
		.uri(uri)
		.header(header::AUTHORIZATION, basic(GATE_USER, GATE_PASSWORD));
	let built = match form {
		Some(form) => builder
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(form.to_owned())),
		None => builder.body(Body::empty()),
	};

	built.expect("Test request should build.")
}

/// Collects a response body as UTF-8.
pub async fn read_text(response: Response) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8.")
}
