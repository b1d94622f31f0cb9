//! Broker-level error types shared across the workflow, management client, and HTTP surface.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A required request field was missing or empty; no remote call was made.
	#[error("{message}")]
	Validation {
		/// Plain-text message returned to the caller.
		message: String,
	},
	/// Management API rejected a call whose status was inspected by the workflow.
	///
	/// Raised after the workflow has unwound its compensations.
	#[error("Error, rabbitmq returned status code {status}")]
	UpstreamRejected {
		/// HTTP status code returned by the management API.
		status: u16,
	},
	/// Management API rejected a call made with [`StatusPolicy::Raise`](crate::http::StatusPolicy).
	#[error("Error, rabbitmq returned status code {status}")]
	UpstreamStatus {
		/// HTTP status code returned by the management API.
		status: u16,
	},
	/// Aliveness body was not a JSON object with a `status` field.
	#[error("Error pinging service, malformed response from rabbitmq, content: {body}")]
	MalformedUpstreamResponse {
		/// Raw response body.
		body: String,
	},
	/// Aliveness body parsed but reported a status other than `ok`.
	#[error("Error pinging rabbitmq, content: {body}")]
	UpstreamUnhealthy {
		/// Raw response body.
		body: String,
	},
}
impl Error {
	/// Builds a [`Error::Validation`] carrying the caller-visible message.
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	/// Returns `true` when the error originates from the caller's input.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::Validation { .. })
	}
}

/// Configuration and client construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Management endpoint could not be turned into a base URL.
	#[error("Management endpoint `{endpoint}` is not a valid base URL.")]
	InvalidEndpoint {
		/// Endpoint as assembled from host and port.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Required configuration variable is absent.
	#[error("Configuration variable `{name}` is not set.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Configuration variable is set but cannot be parsed.
	#[error("Configuration variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Parser-supplied reason string.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
///
/// The display text is the underlying transport message so callers see what actually failed.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("{source}")]
	Network {
		/// Transport-specific network error.
		source: BoxError,
	},
	/// Request exceeded the fixed management-call timeout.
	#[error("{source}")]
	Timeout {
		/// Absolute URL that was being called.
		url: String,
		/// Timeout applied to the call.
		timeout: Duration,
		/// Transport-specific timeout error.
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error for the call to `url`.
	pub fn timeout(
		url: impl Into<String>,
		timeout: Duration,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Timeout { url: url.into(), timeout, source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_messages_embed_status_code() {
		let rejected = Error::UpstreamRejected { status: 400 };
		let fatal = Error::UpstreamStatus { status: 503 };

		assert_eq!(rejected.to_string(), "Error, rabbitmq returned status code 400");
		assert_eq!(fatal.to_string(), "Error, rabbitmq returned status code 503");
	}

	#[test]
	fn transport_network_error_surfaces_source_text() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
		let err = Error::from(TransportError::network(io));

		assert_eq!(err.to_string(), "connection refused");
		assert!(!err.is_client_error());
	}

	#[test]
	fn transport_timeout_surfaces_source_text() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
		let err = Error::from(TransportError::timeout(
			"http://example.com:15672/api/vhosts/foobar",
			Duration::from_secs(5),
			io,
		));

		assert_eq!(err.to_string(), "operation timed out");
		assert!(matches!(
			err,
			Error::Transport(TransportError::Timeout { ref url, timeout, .. })
				if url == "http://example.com:15672/api/vhosts/foobar"
					&& timeout == Duration::from_secs(5)
		));
	}

	#[test]
	fn validation_is_client_error() {
		let err = Error::validation("Error, missing name argument");

		assert!(err.is_client_error());
		assert_eq!(err.to_string(), "Error, missing name argument");
	}
}
