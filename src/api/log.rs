//! Request logging middleware.

// crates.io
use axum::{
	extract::Request,
	http::{HeaderMap, header::AUTHORIZATION},
	middleware::Next,
	response::Response,
};

const REDACTED: &str = "<redacted>";

/// Logs method, URI, and headers of every incoming request at debug level.
///
/// The `Authorization` header value is never logged.
pub async fn log_request(request: Request, next: Next) -> Response {
	tracing::debug!(
		method = %request.method(),
		uri = %request.uri(),
		headers = ?loggable_headers(request.headers()),
		"incoming request"
	);

	next.run(request).await
}

/// Renders headers as `(name, value)` pairs with credentials redacted.
pub fn loggable_headers(headers: &HeaderMap) -> Vec<(String, String)> {
	headers
		.iter()
		.map(|(name, value)| {
			let value = if name == AUTHORIZATION {
				REDACTED.to_owned()
			} else {
				String::from_utf8_lossy(value.as_bytes()).into_owned()
			};

			(name.as_str().to_owned(), value)
		})
		.collect()
}
