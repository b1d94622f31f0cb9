//! Process configuration for the broker.
//!
//! Every setting is passed explicitly through [`BrokerConfig`]; nothing reads ambient globals after
//! startup. [`BrokerConfig::from_env`] reads the conventional variable names, while
//! [`BrokerConfig::from_lookup`] accepts any lookup function so tests never touch process env.

// std
use std::net::SocketAddr;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Variable holding the gate username.
pub const VAR_USERNAME: &str = "USERNAME";
/// Variable holding the gate password.
pub const VAR_PASSWORD: &str = "PASSWORD";
/// Variable holding the RabbitMQ host, shared by AMQP and the management API.
pub const VAR_RMQ_HOST: &str = "RMQ_HOST";
/// Variable holding the AMQP port handed to bound applications.
pub const VAR_RMQ_PORT: &str = "RMQ_PORT";
/// Variable holding the management API port.
pub const VAR_RMQ_MGMT_PORT: &str = "RMQ_MGMT_PORT";
/// Variable holding the management API user.
pub const VAR_RMQ_USER: &str = "RMQ_USER";
/// Variable holding the management API password.
pub const VAR_RMQ_PASSWORD: &str = "RMQ_PASSWORD";
/// Variable holding the credential derivation salt.
pub const VAR_SALT: &str = "SALT";
/// Optional variable overriding the listen address.
pub const VAR_BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Static credentials callers must present to the broker's protected routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateCredentials {
	/// Expected Basic-auth username.
	pub username: String,
	/// Expected Basic-auth password.
	pub password: Secret,
}
impl GateCredentials {
	/// Creates a new credential pair.
	pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}

/// Connection settings for the RabbitMQ management API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagementConfig {
	/// RabbitMQ host name.
	pub host: String,
	/// Management API port.
	pub port: u16,
	/// Management API user; also receives full permissions on every new vhost.
	pub user: String,
	/// Management API password.
	pub password: Secret,
}
impl ManagementConfig {
	/// Creates a new management endpoint description.
	pub fn new(
		host: impl Into<String>,
		port: u16,
		user: impl Into<String>,
		password: impl Into<Secret>,
	) -> Self {
		Self { host: host.into(), port, user: user.into(), password: password.into() }
	}

	/// Returns the API root, `http://{host}:{port}/api/`.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		let endpoint = format!("http://{}:{}/api/", self.host, self.port);

		Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
	}
}

/// Complete broker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
	/// Credentials required by protected routes.
	pub gate: GateCredentials,
	/// Management API settings.
	pub management: ManagementConfig,
	/// AMQP port reported to bound applications.
	pub amqp_port: u16,
	/// Salt keying credential derivation.
	pub salt: Secret,
	/// Address the HTTP server listens on.
	pub bind_addr: SocketAddr,
}
impl BrokerConfig {
	/// Assembles a configuration listening on the default address.
	pub fn new(
		gate: GateCredentials,
		management: ManagementConfig,
		amqp_port: u16,
		salt: impl Into<Secret>,
	) -> Self {
		Self {
			gate,
			management,
			amqp_port,
			salt: salt.into(),
			bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
		}
	}

	/// Overrides the listen address.
	pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
		self.bind_addr = bind_addr;

		self
	}

	/// Reads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar { name });
		let gate = GateCredentials::new(required(VAR_USERNAME)?, required(VAR_PASSWORD)?);
		let management = ManagementConfig::new(
			required(VAR_RMQ_HOST)?,
			parse_var(VAR_RMQ_MGMT_PORT, &required(VAR_RMQ_MGMT_PORT)?)?,
			required(VAR_RMQ_USER)?,
			required(VAR_RMQ_PASSWORD)?,
		);
		let amqp_port = parse_var(VAR_RMQ_PORT, &required(VAR_RMQ_PORT)?)?;
		let salt = required(VAR_SALT)?;
		let bind_addr = parse_var(
			VAR_BIND_ADDR,
			&lookup(VAR_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
		)?;

		Ok(Self::new(gate, management, amqp_port, salt).with_bind_addr(bind_addr))
	}
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: Display,
{
	raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar { name, reason: e.to_string() })
}
