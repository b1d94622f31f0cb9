//! Aliveness check for an instance vhost.

// self
use crate::{
	_prelude::*,
	http::{ManagementHttpClient, StatusPolicy},
	obs::WorkflowKind,
	workflow::Broker,
};

const HEALTHY_STATUS: &str = "ok";

#[derive(Debug, Deserialize)]
struct Aliveness {
	status: serde_json::Value,
}

impl<C> Broker<C>
where
	C: ?Sized + ManagementHttpClient,
{
	/// Runs the management aliveness test against the vhost `instance`.
	///
	/// Succeeds only when the body is a JSON object whose `status` is `"ok"`. Unparseable bodies
	/// and bodies without a `status` key are malformed; any other `status` value, strings or not,
	/// is unhealthy. Both errors quote the raw body.
	pub async fn check_health(&self, instance: &str) -> Result<()> {
		let instance = super::instance_name(instance)?;

		self.observe(WorkflowKind::HealthCheck, &instance, async {
			let response = self.client.aliveness_test(&instance, StatusPolicy::Raise).await?;
			let aliveness = parse_aliveness(&response.body)?;

			if aliveness.status.as_str() != Some(HEALTHY_STATUS) {
				return Err(Error::UpstreamUnhealthy { body: response.body });
			}

			Ok(())
		})
		.await
	}
}

fn parse_aliveness(body: &str) -> Result<Aliveness> {
	let malformed = || Error::MalformedUpstreamResponse { body: body.to_owned() };
	let mut de = serde_json::Deserializer::from_str(body);
	let aliveness: Aliveness = serde_path_to_error::deserialize(&mut de).map_err(|e| {
		tracing::debug!(path = %e.path(), error = %e.inner(), "aliveness body did not parse");

		malformed()
	})?;

	de.end().map_err(|_| malformed())?;

	Ok(aliveness)
}
