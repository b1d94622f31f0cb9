//! Typed client for the RabbitMQ management API.
//!
//! [`ManagementClient::send`] is the single choke point for outbound calls: it resolves the URL
//! under `/api`, attaches the configured credentials and timeout, and applies the caller's
//! [`StatusPolicy`]. The typed helpers below it encode the handful of endpoints the broker uses.

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::ManagementConfig,
	error::ConfigError,
	http::{
		ManagementHttpClient, ManagementResponse, Method, OutboundRequest, REQUEST_TIMEOUT,
		StatusPolicy,
	},
};

/// Name of the high-availability policy applied to every new vhost.
pub const HA_POLICY_NAME: &str = "ha-all";

/// Permission body granting configure, write, and read on every resource.
pub fn full_permissions() -> Value {
	json!({ "configure": ".*", "write": ".*", "read": ".*" })
}

/// Policy body mirroring every queue across all nodes with automatic synchronization.
pub fn ha_policy() -> Value {
	json!({
		"pattern": ".*",
		"definition": { "ha-mode": "all", "ha-sync-mode": "automatic" },
		"apply-to": "queues",
	})
}

/// Authenticated client bound to one management endpoint.
pub struct ManagementClient<C>
where
	C: ?Sized + ManagementHttpClient,
{
	http: Arc<C>,
	base_url: Url,
	user: String,
	password: Secret,
	timeout: Duration,
}
impl<C> ManagementClient<C>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Creates a client for the endpoint described by `config`.
	pub fn new(config: &ManagementConfig, http: impl Into<Arc<C>>) -> Result<Self, ConfigError> {
		Ok(Self {
			http: http.into(),
			base_url: config.base_url()?,
			user: config.user.clone(),
			password: config.password.clone(),
			timeout: REQUEST_TIMEOUT,
		})
	}

	/// Overrides the per-call timeout (defaults to [`REQUEST_TIMEOUT`]).
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Management user that owns the connection.
	pub fn user(&self) -> &str {
		&self.user
	}

	/// Resolves `segments` under the API root, percent-encoding each one.
	pub fn url_for(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();

		// `base_url` is always an `http://` URL, which can be a base.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}

	/// Issues one request and applies `policy` to error statuses.
	///
	/// Transport failures always fail with [`Error::Transport`]. Statuses `>= 400` fail with
	/// [`Error::UpstreamStatus`] under [`StatusPolicy::Raise`] and are returned untouched under
	/// [`StatusPolicy::Inspect`].
	pub async fn send(
		&self,
		method: Method,
		segments: &[&str],
		body: Option<&Value>,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		let url = self.url_for(segments);
		let request = OutboundRequest {
			method,
			url: url.clone(),
			username: self.user.clone(),
			password: self.password.clone(),
			body: body.map(Value::to_string),
			timeout: self.timeout,
		};
		let response = match self.http.execute(request).await {
			Ok(response) => response,
			Err(e) => {
				tracing::warn!(%method, %url, error = %e, "management call failed in transport");

				return Err(e.into());
			},
		};

		tracing::debug!(%method, %url, status = response.status, "management call completed");

		if !response.is_success() && policy == StatusPolicy::Raise {
			return Err(Error::UpstreamStatus { status: response.status });
		}

		Ok(response)
	}

	/// `PUT /vhosts/{vhost}`
	pub async fn put_vhost(&self, vhost: &str, policy: StatusPolicy) -> Result<ManagementResponse> {
		self.send(Method::Put, &["vhosts", vhost], None, policy).await
	}

	/// `DELETE /vhosts/{vhost}`
	pub async fn delete_vhost(
		&self,
		vhost: &str,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		self.send(Method::Delete, &["vhosts", vhost], None, policy).await
	}

	/// `PUT /users/{username}` with an untagged user.
	pub async fn put_user(
		&self,
		username: &str,
		password: &Secret,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		let body = json!({ "password": password.expose(), "tags": "" });

		self.send(Method::Put, &["users", username], Some(&body), policy).await
	}

	/// `DELETE /users/{username}`
	pub async fn delete_user(
		&self,
		username: &str,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		self.send(Method::Delete, &["users", username], None, policy).await
	}

	/// `PUT /permissions/{vhost}/{username}` granting [`full_permissions`].
	pub async fn put_permissions(
		&self,
		vhost: &str,
		username: &str,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		self.send(
			Method::Put,
			&["permissions", vhost, username],
			Some(&full_permissions()),
			policy,
		)
		.await
	}

	/// `PUT /policies/{vhost}/{name}`
	pub async fn put_policy(
		&self,
		vhost: &str,
		name: &str,
		definition: &Value,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		self.send(Method::Put, &["policies", vhost, name], Some(definition), policy).await
	}

	/// `GET /aliveness-test/{vhost}`
	pub async fn aliveness_test(
		&self,
		vhost: &str,
		policy: StatusPolicy,
	) -> Result<ManagementResponse> {
		self.send(Method::Get, &["aliveness-test", vhost], None, policy).await
	}
}
impl<C> Debug for ManagementClient<C>
where
	C: ?Sized + ManagementHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ManagementClient")
			.field("base_url", &self.base_url.as_str())
			.field("user", &self.user)
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{error::TransportError, http::TransportFuture};

	struct TimingOut;
	impl ManagementHttpClient for TimingOut {
		fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");

				Err(TransportError::timeout(request.url.as_str(), request.timeout, io))
			})
		}
	}

	fn client() -> ManagementClient<TimingOut> {
		let config = ManagementConfig::new("example.com", 15672, "admin", "secret");

		ManagementClient::new(&config, TimingOut).expect("Static endpoint should parse.")
	}

	#[test]
	fn url_segments_are_percent_encoded() {
		let client = client();

		assert_eq!(
			client.url_for(&["vhosts", "foobar"]).as_str(),
			"http://example.com:15672/api/vhosts/foobar"
		);
		assert_eq!(
			client.url_for(&["permissions", "/", "user name"]).as_str(),
			"http://example.com:15672/api/permissions/%2F/user%20name"
		);
	}

	#[test]
	fn policy_and_permission_bodies_are_fixed() {
		assert_eq!(full_permissions()["configure"], ".*");
		assert_eq!(full_permissions()["read"], ".*");
		assert_eq!(ha_policy()["definition"]["ha-mode"], "all");
		assert_eq!(ha_policy()["apply-to"], "queues");
	}

	#[test]
	fn debug_output_hides_password() {
		let rendered = format!("{:?}", client());

		assert!(rendered.contains("admin"));
		assert!(!rendered.contains("secret"));
	}

	#[tokio::test]
	async fn transport_failures_are_fatal_regardless_of_policy() {
		let client = client();
		let err = client
			.put_vhost("foobar", StatusPolicy::Inspect)
			.await
			.expect_err("Transport failure should not be inspectable.");

		assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
	}
}
