//! Maps broker errors onto broker-protocol responses.
//!
//! Bodies are plain text: the orchestrator shows them to operators verbatim.

// crates.io
use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

impl Error {
	/// HTTP status returned to the orchestrator for this error.
	pub fn status_code(&self) -> StatusCode {
		if self.is_client_error() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}
}
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();

		if status.is_server_error() {
			tracing::error!(error = ?self, "request failed");
		}

		(status, self.to_string()).into_response()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validation_maps_to_bad_request() {
		assert_eq!(Error::validation("nope").status_code(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn upstream_failures_map_to_internal_error() {
		for err in [
			Error::UpstreamRejected { status: 400 },
			Error::UpstreamStatus { status: 404 },
			Error::MalformedUpstreamResponse { body: "{".into() },
			Error::UpstreamUnhealthy { body: "{}".into() },
		] {
			assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		}
	}

	#[test]
	fn response_carries_status() {
		let response = Error::UpstreamRejected { status: 400 }.into_response();

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
