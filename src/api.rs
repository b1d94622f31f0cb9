//! Broker-protocol HTTP surface.
//!
//! # Routes
//!
//! | Method | Path | Auth | Success |
//! |---|---|---|---|
//! | POST | `/resources` | yes | 201 |
//! | DELETE | `/resources/{name}` | yes | 200 |
//! | POST | `/resources/{name}/bind-app` | yes | 201 + JSON |
//! | DELETE | `/resources/{name}/bind-app` | yes | 200 |
//! | GET | `/resources/{name}/status` | yes | 204 |
//! | POST | `/resources/{name}/bind` | yes | 201 |
//! | DELETE | `/resources/{name}/bind` | yes | 200 |
//! | GET | `/resources/plans` | no | 200 + `[]` |
//! | DELETE | `/resources/plans` | yes | 200, deletes the instance named `plans` |

pub mod error;
pub mod gate;
pub mod handlers;
pub mod log;

// crates.io
use axum::{
	Router, middleware,
	routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::{BrokerConfig, GateCredentials},
	error::ConfigError,
	workflow::Broker,
};

/// Shared state injected into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Workflow entry point.
	pub broker: Arc<Broker>,
	/// Credentials required by protected routes.
	pub gate: Arc<GateCredentials>,
}
impl AppState {
	/// Wraps an existing broker and gate credentials.
	pub fn new(broker: Broker, gate: GateCredentials) -> Self {
		Self { broker: Arc::new(broker), gate: Arc::new(gate) }
	}

	/// Builds the state, including a reqwest-backed broker, from `config`.
	pub fn from_config(config: &BrokerConfig) -> Result<Self, ConfigError> {
		Ok(Self::new(Broker::shared(config)?, config.gate.clone()))
	}
}

/// Builds the complete router: protected resource routes behind the Basic-auth gate, the open
/// plan listing, request logging, and HTTP tracing.
///
/// `/resources/plans` shadows `/resources/{name}`, so deleting an instance named `plans` is routed
/// on the static path, behind the gate like every other delete.
pub fn build_router(state: AppState) -> Router {
	let gate = middleware::from_fn_with_state(state.clone(), gate::require_basic_auth);
	let plans = get(handlers::plans)
		.merge(delete(handlers::delete_plans_instance).route_layer(gate.clone()));
	let protected = Router::new()
		.route("/resources", post(handlers::create_instance))
		.route("/resources/{name}", delete(handlers::delete_instance))
		.route("/resources/{name}/bind-app", post(handlers::bind_app).delete(handlers::unbind_app))
		.route("/resources/{name}/status", get(handlers::status))
		.route("/resources/{name}/bind", post(handlers::bind_unit).delete(handlers::unbind_unit))
		.route_layer(gate);

	Router::new()
		.route("/resources/plans", plans)
		.merge(protected)
		.layer(middleware::from_fn(log::log_request))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	axum::serve(listener, build_router(state)).with_graceful_shutdown(shutdown).await
}
