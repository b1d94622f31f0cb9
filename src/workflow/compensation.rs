//! Compensating actions recorded by workflows and unwound on partial failure.

// self
use crate::{
	_prelude::*,
	http::{ManagementHttpClient, StatusPolicy},
	management::ManagementClient,
	obs::{self, CompensationOutcome},
};

/// Undo record for one successfully applied workflow step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Compensation {
	/// Remove a vhost created earlier in the workflow; RabbitMQ drops its permissions and
	/// policies with it.
	DeleteVhost {
		/// Vhost name.
		vhost: String,
	},
	/// Remove a user created earlier in the workflow.
	DeleteUser {
		/// RabbitMQ username.
		username: String,
	},
}
impl Compensation {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn label(&self) -> &'static str {
		match self {
			Compensation::DeleteVhost { .. } => "delete_vhost",
			Compensation::DeleteUser { .. } => "delete_user",
		}
	}

	/// Executes the undo call once and reports whether it took effect.
	///
	/// Never fails: transport errors and rejected statuses are logged and reported as
	/// [`CompensationOutcome::Failed`].
	pub async fn apply<C>(&self, client: &ManagementClient<C>) -> CompensationOutcome
	where
		C: ?Sized + ManagementHttpClient,
	{
		let result = match self {
			Compensation::DeleteVhost { vhost } =>
				client.delete_vhost(vhost, StatusPolicy::Inspect).await,
			Compensation::DeleteUser { username } =>
				client.delete_user(username, StatusPolicy::Inspect).await,
		};
		let outcome = match result {
			Ok(response) if response.is_success() => CompensationOutcome::Applied,
			Ok(response) => {
				tracing::warn!(
					compensation = self.label(),
					status = response.status,
					"compensation rejected by rabbitmq"
				);

				CompensationOutcome::Failed
			},
			Err(e) => {
				tracing::warn!(compensation = self.label(), error = %e, "compensation failed");

				CompensationOutcome::Failed
			},
		};

		obs::record_compensation(self.label(), outcome);

		outcome
	}
}

/// Stack of compensations for the steps a workflow has completed so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compensations(Vec<Compensation>);
impl Compensations {
	/// Creates an empty stack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the undo action for a step that just succeeded.
	pub fn push(&mut self, compensation: Compensation) {
		self.0.push(compensation);
	}

	/// Number of recorded compensations.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when nothing needs undoing.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Compensations in the order they would run during [`unwind`](Self::unwind).
	pub fn pending(&self) -> impl Iterator<Item = &Compensation> {
		self.0.iter().rev()
	}

	/// Runs every compensation in reverse order, continuing past failures.
	///
	/// Returns the outcome of each compensation in execution order.
	pub async fn unwind<C>(self, client: &ManagementClient<C>) -> Vec<CompensationOutcome>
	where
		C: ?Sized + ManagementHttpClient,
	{
		let mut outcomes = Vec::with_capacity(self.0.len());

		for compensation in self.0.into_iter().rev() {
			outcomes.push(compensation.apply(client).await);
		}

		outcomes
	}

	/// Unwinds the stack and hands back `err`, which always wins over compensation failures.
	pub async fn fail<C, T>(self, client: &ManagementClient<C>, err: Error) -> Result<T>
	where
		C: ?Sized + ManagementHttpClient,
	{
		if !self.is_empty() {
			tracing::info!(steps = self.len(), error = %err, "rolling back partially applied workflow");
		}

		self.unwind(client).await;

		Err(err)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{http::Method, workflow::testing::ScriptedHttpClient};

	#[tokio::test]
	async fn unwind_runs_in_reverse_and_continues_past_failures() {
		let (client, http) = ScriptedHttpClient::new()
			.respond(Method::Delete, "/api/vhosts/rejected", 404, "")
			.fail(Method::Delete, "/api/users/broken")
			.client();
		let mut stack = Compensations::new();

		stack.push(Compensation::DeleteVhost { vhost: "rejected".into() });
		stack.push(Compensation::DeleteUser { username: "broken".into() });
		stack.push(Compensation::DeleteUser { username: "fine".into() });

		assert_eq!(stack.len(), 3);
		assert_eq!(
			stack.pending().next(),
			Some(&Compensation::DeleteUser { username: "fine".into() })
		);

		let outcomes = stack.unwind(&client).await;

		assert_eq!(
			outcomes,
			vec![
				CompensationOutcome::Applied,
				CompensationOutcome::Failed,
				CompensationOutcome::Failed,
			]
		);
		assert_eq!(
			http.calls(),
			vec![
				(Method::Delete, "/api/users/fine".to_owned()),
				(Method::Delete, "/api/users/broken".to_owned()),
				(Method::Delete, "/api/vhosts/rejected".to_owned()),
			]
		);
	}

	#[tokio::test]
	async fn fail_returns_triggering_error_even_when_undo_fails() {
		let (client, http) =
			ScriptedHttpClient::new().fail(Method::Delete, "/api/users/broken").client();
		let mut stack = Compensations::new();

		stack.push(Compensation::DeleteUser { username: "broken".into() });

		let err = stack
			.fail::<_, ()>(&client, Error::UpstreamRejected { status: 400 })
			.await
			.expect_err("Triggering error must be surfaced.");

		assert!(matches!(err, Error::UpstreamRejected { status: 400 }));
		assert_eq!(http.calls().len(), 1);
	}

	#[tokio::test]
	async fn empty_stack_makes_no_calls() {
		let (client, http) = ScriptedHttpClient::new().client();
		let outcomes = Compensations::new().unwind(&client).await;

		assert!(outcomes.is_empty());
		assert!(http.calls().is_empty());
	}
}
