//! Binding workflows: a derived user plus its permission grant on the instance vhost.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	http::{ManagementHttpClient, StatusPolicy},
	obs::WorkflowKind,
	workflow::{Broker, Compensation, Compensations},
};

/// Connection details returned to a freshly bound application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
	/// AMQP host.
	#[serde(rename = "RABBITMQ_HOST")]
	pub host: String,
	/// AMQP port, rendered as a string.
	#[serde(rename = "RABBITMQ_PORT")]
	pub port: String,
	/// Vhost the credentials are scoped to.
	#[serde(rename = "RABBITMQ_VHOST")]
	pub vhost: String,
	/// Derived username.
	#[serde(rename = "RABBITMQ_USERNAME")]
	pub username: String,
	/// Derived password.
	#[serde(rename = "RABBITMQ_PASSWORD")]
	pub password: Secret,
}

impl<C> Broker<C>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Creates the derived user for `(instance, host)` and grants it full permissions on the
	/// instance vhost.
	///
	/// A rejected permission grant deletes the user again before the error is returned. Repeating
	/// the call for the same pair converges on the same credentials.
	pub async fn create_binding(&self, instance: &str, host: &str) -> Result<BindingInfo> {
		let host = super::app_host(host)?;
		let instance = super::instance_name(instance)?;

		self.observe(WorkflowKind::CreateBinding, &instance, async {
			let credentials = self.deriver.derive(&instance, &host);
			let mut undo = Compensations::new();

			self.client
				.put_user(&credentials.username, &credentials.password, StatusPolicy::Raise)
				.await?;
			undo.push(Compensation::DeleteUser { username: credentials.username.clone() });

			let granted = self
				.client
				.put_permissions(&instance, &credentials.username, StatusPolicy::Inspect)
				.await;
			let granted = match granted {
				Ok(response) => response,
				Err(e) => return undo.fail(&self.client, e).await,
			};

			if !granted.is_success() {
				return undo
					.fail(&self.client, Error::UpstreamRejected { status: granted.status })
					.await;
			}

			tracing::info!(
				instance = %instance,
				host = %host,
				username = %credentials.username,
				"binding created"
			);

			Ok(BindingInfo {
				host: self.amqp_host.clone(),
				port: self.amqp_port.to_string(),
				vhost: instance.to_string(),
				username: credentials.username,
				password: credentials.password,
			})
		})
		.await
	}

	/// Deletes the derived user for `(instance, host)`.
	pub async fn delete_binding(&self, instance: &str, host: &str) -> Result<()> {
		let host = super::app_host(host)?;
		let instance = super::instance_name(instance)?;

		self.observe(WorkflowKind::DeleteBinding, &instance, async {
			let username = self.deriver.username(&instance, &host);

			self.client.delete_user(&username, StatusPolicy::Raise).await?;

			Ok(())
		})
		.await
	}
}
