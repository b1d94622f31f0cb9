//! Broker process: reads configuration from the environment and serves the broker protocol until
//! interrupted.

// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use rabbitmq_broker::{
	api::{self, AppState},
	config::BrokerConfig,
};

const DEFAULT_FILTER: &str = "info,rabbitmq_broker=debug";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	init_tracing();

	let config = BrokerConfig::from_env()?;
	let state = AppState::from_config(&config)?;
	let listener = TcpListener::bind(config.bind_addr).await?;

	tracing::info!(
		addr = %config.bind_addr,
		management = %config.management.base_url()?,
		"rabbitmq broker listening"
	);

	api::serve(listener, state, shutdown_signal()).await?;

	tracing::info!("rabbitmq broker stopped");

	Ok(())
}

fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "failed to listen for shutdown signal");
	}
}
