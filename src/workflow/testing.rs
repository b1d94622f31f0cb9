//! Scripted transport shared by workflow unit tests.

// std
use std::collections::HashMap;
// crates.io
use parking_lot::Mutex;
// self
use crate::{
	_prelude::*,
	config::{BrokerConfig, GateCredentials, ManagementConfig},
	error::TransportError,
	http::{ManagementHttpClient, ManagementResponse, Method, OutboundRequest, TransportFuture},
	management::ManagementClient,
	workflow::Broker,
};

pub(crate) const TEST_SALT: &str = "foooosalt";

enum Scripted {
	Respond { status: u16, body: String },
	Fail,
}

/// Transport that answers from a script keyed by method + path and records every request.
///
/// Unscripted requests answer `200` with an empty body.
#[derive(Default)]
pub(crate) struct ScriptedHttpClient {
	script: HashMap<(Method, String), Scripted>,
	requests: Mutex<Vec<OutboundRequest>>,
}
impl ScriptedHttpClient {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn respond(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
		self.script
			.insert((method, path.to_owned()), Scripted::Respond { status, body: body.to_owned() });

		self
	}

	pub(crate) fn fail(mut self, method: Method, path: &str) -> Self {
		self.script.insert((method, path.to_owned()), Scripted::Fail);

		self
	}

	pub(crate) fn client(self) -> (ManagementClient<Self>, Arc<Self>) {
		let http = Arc::new(self);
		let client = ManagementClient::new(&test_config().management, http.clone())
			.expect("Test endpoint should parse.");

		(client, http)
	}

	pub(crate) fn broker(self) -> (Broker<Self>, Arc<Self>) {
		let http = Arc::new(self);
		let broker = Broker::with_http_client(&test_config(), http.clone())
			.expect("Test broker should build.");

		(broker, http)
	}

	pub(crate) fn calls(&self) -> Vec<(Method, String)> {
		self.requests.lock().iter().map(|r| (r.method, r.url.path().to_owned())).collect()
	}

	pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
		self.requests.lock().clone()
	}
}
impl ManagementHttpClient for ScriptedHttpClient {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let key = (request.method, request.url.path().to_owned());
		let url = request.url.to_string();
		let timeout = request.timeout;

		self.requests.lock().push(request);

		let outcome = match self.script.get(&key) {
			Some(Scripted::Respond { status, body }) =>
				Ok(ManagementResponse { status: *status, body: body.clone() }),
			Some(Scripted::Fail) => Err(TransportError::timeout(
				url,
				timeout,
				std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out"),
			)),
			None => Ok(ManagementResponse { status: 200, body: String::new() }),
		};

		Box::pin(async move { outcome })
	}
}

pub(crate) fn test_config() -> BrokerConfig {
	BrokerConfig::new(
		GateCredentials::new("foo", "bar"),
		ManagementConfig::new("example.com", 15672, "admin", "admin-secret"),
		6672,
		TEST_SALT,
	)
}
