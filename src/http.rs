//! Transport primitives for management API calls.
//!
//! [`ManagementHttpClient`] is the broker's only dependency on an HTTP stack. It receives a fully
//! described [`OutboundRequest`] (absolute URL, Basic credentials, JSON body, timeout) and reports
//! either a [`ManagementResponse`] or a [`TransportError`]. Status-code policy lives one layer up in
//! [`ManagementClient`](crate::management::ManagementClient), so transports never interpret
//! response codes.

// std
use std::ops::Deref;
// crates.io
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, TransportError},
};

/// Fixed timeout applied to every management call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed future returned by [`ManagementHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ManagementResponse, TransportError>> + 'a + Send>>;

/// HTTP verbs used against the management API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<Method> for reqwest::Method {
	fn from(value: Method) -> Self {
		match value {
			Method::Get => reqwest::Method::GET,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// How a caller wants error statuses (`>= 400`) handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusPolicy {
	/// Fail the whole request chain with [`Error::UpstreamStatus`].
	Raise,
	/// Hand the response back untouched so the caller can inspect it.
	Inspect,
}

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Basic-auth username.
	pub username: String,
	/// Basic-auth password.
	pub password: Secret,
	/// Serialized JSON body, if any.
	pub body: Option<String>,
	/// Per-request timeout.
	pub timeout: Duration,
}

/// Status and body captured from a management API response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagementResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl ManagementResponse {
	/// Returns `true` for statuses below 400.
	pub fn is_success(&self) -> bool {
		self.status < 400
	}
}

/// Abstraction over HTTP transports able to reach the management API.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// in-flight request, and their futures must be `Send` so handlers can run on a multi-threaded
/// runtime.
pub trait ManagementHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` exactly once.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a pooled reqwest client on the rustls backend.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl ManagementHttpClient for ReqwestHttpClient {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let OutboundRequest { method, url, username, password, body, timeout } = request;
			let mut builder = self
				.0
				.request(method.into(), url.clone())
				.basic_auth(username, Some(password.expose()))
				.header(CONTENT_TYPE, "application/json")
				.timeout(timeout);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response =
				builder.send().await.map_err(|e| map_reqwest_error(e, &url, timeout))?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(|e| map_reqwest_error(e, &url, timeout))?;

			Ok(ManagementResponse { status, body })
		})
	}
}

fn map_reqwest_error(err: ReqwestError, url: &Url, timeout: Duration) -> TransportError {
	if err.is_timeout() {
		TransportError::timeout(url.as_str(), timeout, err)
	} else {
		TransportError::network(err)
	}
}
