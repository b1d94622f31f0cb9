//! Provisioning workflows powered by the management client.
//!
//! Each workflow is a short chain of dependent management calls. State-changing steps push a
//! [`Compensation`] once they succeed; when a later step fails, the stack is unwound in reverse
//! order on a best-effort basis and the triggering error is returned unchanged.

pub mod binding;
pub mod compensation;
pub mod health;
pub mod instance;

#[cfg(test)] pub(crate) mod testing;

pub use binding::*;
pub use compensation::*;

// self
use crate::{
	_prelude::*,
	auth::{AppHost, CredentialDeriver, InstanceName},
	config::BrokerConfig,
	error::ConfigError,
	http::{ManagementHttpClient, ReqwestHttpClient},
	management::ManagementClient,
	obs::{self, WorkflowKind, WorkflowOutcome, WorkflowSpan},
};

/// Validation message for a missing instance name.
pub const MISSING_NAME_MESSAGE: &str = "Error, missing name argument";
/// Validation message for a missing application host.
pub const MISSING_APP_HOST_MESSAGE: &str = "Parameter `app-host` is empty";

/// Coordinates provisioning workflows against one RabbitMQ cluster.
///
/// The broker is stateless: it owns the management client, the credential deriver, and the public
/// AMQP endpoint handed to bound applications. It is cheap to share behind an [`Arc`].
pub struct Broker<C = dyn ManagementHttpClient>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Management API client used for every outbound call.
	pub client: ManagementClient<C>,
	/// Deriver for per-host binding credentials.
	pub deriver: CredentialDeriver,
	/// AMQP host reported to bound applications.
	pub amqp_host: String,
	/// AMQP port reported to bound applications.
	pub amqp_port: u16,
}
impl<C> Broker<C>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		config: &BrokerConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			client: ManagementClient::new(&config.management, http_client)?,
			deriver: CredentialDeriver::new(&config.salt)?,
			amqp_host: config.management.host.clone(),
			amqp_port: config.amqp_port,
		})
	}

	/// Overrides the per-call management timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.client = self.client.with_timeout(timeout);

		self
	}

	async fn observe<T, Fut>(&self, kind: WorkflowKind, instance: &str, fut: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		let span = WorkflowSpan::new(kind, instance);

		obs::record_workflow_outcome(kind, WorkflowOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_workflow_outcome(kind, WorkflowOutcome::Success),
			Err(e) => {
				obs::record_workflow_outcome(kind, WorkflowOutcome::Failure);
				tracing::info!(workflow = kind.as_str(), instance, error = %e, "workflow failed");
			},
		}

		result
	}
}
impl Broker<ReqwestHttpClient> {
	/// Creates a new broker with its own reqwest-backed transport.
	pub fn new(config: &BrokerConfig) -> Result<Self, ConfigError> {
		Self::with_http_client(config, ReqwestHttpClient::new()?)
	}
}
impl Broker {
	/// Creates a type-erased broker with its own reqwest-backed transport.
	pub fn shared(config: &BrokerConfig) -> Result<Self, ConfigError> {
		let http_client: Arc<dyn ManagementHttpClient> = Arc::new(ReqwestHttpClient::new()?);

		Self::with_http_client(config, http_client)
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + ManagementHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("client", &self.client)
			.field("amqp_host", &self.amqp_host)
			.field("amqp_port", &self.amqp_port)
			.finish()
	}
}

fn instance_name(raw: &str) -> Result<InstanceName> {
	InstanceName::new(raw).map_err(|_| Error::validation(MISSING_NAME_MESSAGE))
}

fn app_host(raw: &str) -> Result<AppHost> {
	AppHost::new(raw).map_err(|_| Error::validation(MISSING_APP_HOST_MESSAGE))
}
