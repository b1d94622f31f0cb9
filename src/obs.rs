//! Observability helpers for broker workflows.
//!
//! Every workflow runs inside a span named `rabbitmq_broker.workflow` carrying the `workflow` and
//! `instance` fields. Enable the `metrics` feature to increment
//! `rabbitmq_broker_workflow_total{workflow,outcome}` for every attempt/success/failure and
//! `rabbitmq_broker_rollback_total{compensation,outcome}` for every compensation that runs.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Workflow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
	/// Vhost creation with permission grant and HA policy.
	CreateInstance,
	/// Vhost removal.
	DeleteInstance,
	/// User creation with permission grant.
	CreateBinding,
	/// User removal.
	DeleteBinding,
	/// Aliveness check.
	HealthCheck,
}
impl WorkflowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			WorkflowKind::CreateInstance => "create_instance",
			WorkflowKind::DeleteInstance => "delete_instance",
			WorkflowKind::CreateBinding => "create_binding",
			WorkflowKind::DeleteBinding => "delete_binding",
			WorkflowKind::HealthCheck => "health_check",
		}
	}
}
impl Display for WorkflowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each workflow attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowOutcome {
	/// Entry to a workflow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl WorkflowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			WorkflowOutcome::Attempt => "attempt",
			WorkflowOutcome::Success => "success",
			WorkflowOutcome::Failure => "failure",
		}
	}
}
impl Display for WorkflowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each compensation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompensationOutcome {
	/// The undo call succeeded.
	Applied,
	/// The undo call failed and was swallowed.
	Failed,
}
impl CompensationOutcome {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CompensationOutcome::Applied => "applied",
			CompensationOutcome::Failed => "failed",
		}
	}
}
