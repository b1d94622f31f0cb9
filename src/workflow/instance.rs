//! Instance workflows: a vhost, an admin permission grant, and the HA policy.

// self
use crate::{
	_prelude::*,
	http::{ManagementHttpClient, StatusPolicy},
	management::{self, HA_POLICY_NAME},
	obs::WorkflowKind,
	workflow::{Broker, Compensation, Compensations},
};

impl<C> Broker<C>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Creates the vhost `name`, grants the management user full permissions on it, and applies
	/// the HA policy.
	///
	/// A rejected permission grant or policy deletes the vhost again before the error is returned.
	/// A failure creating the vhost itself aborts with nothing to undo.
	pub async fn create_instance(&self, name: &str) -> Result<()> {
		let name = super::instance_name(name)?;

		self.observe(WorkflowKind::CreateInstance, &name, async {
			let mut undo = Compensations::new();

			self.client.put_vhost(&name, StatusPolicy::Raise).await?;
			undo.push(Compensation::DeleteVhost { vhost: name.to_string() });

			let granted =
				self.client.put_permissions(&name, self.client.user(), StatusPolicy::Inspect).await;
			let granted = match granted {
				Ok(response) => response,
				Err(e) => return undo.fail(&self.client, e).await,
			};

			if !granted.is_success() {
				return undo
					.fail(&self.client, Error::UpstreamRejected { status: granted.status })
					.await;
			}

			// Permissions go away with the vhost, so the grant adds no compensation of its own.
			let applied = self
				.client
				.put_policy(&name, HA_POLICY_NAME, &management::ha_policy(), StatusPolicy::Inspect)
				.await;
			let applied = match applied {
				Ok(response) => response,
				Err(e) => return undo.fail(&self.client, e).await,
			};

			if !applied.is_success() {
				return undo
					.fail(&self.client, Error::UpstreamRejected { status: applied.status })
					.await;
			}

			tracing::info!(instance = %name, "instance provisioned");

			Ok(())
		})
		.await
	}

	/// Deletes the vhost `name`, which drops its users' permissions and policies with it.
	pub async fn delete_instance(&self, name: &str) -> Result<()> {
		let name = super::instance_name(name)?;

		self.observe(WorkflowKind::DeleteInstance, &name, async {
			self.client.delete_vhost(&name, StatusPolicy::Raise).await?;

			Ok(())
		})
		.await
	}
}
