// self
use crate::obs::{CompensationOutcome, WorkflowKind, WorkflowOutcome};

/// Records a workflow outcome via the global metrics recorder (when enabled).
pub fn record_workflow_outcome(kind: WorkflowKind, outcome: WorkflowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rabbitmq_broker_workflow_total",
			"workflow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a compensation outcome via the global metrics recorder (when enabled).
pub fn record_compensation(label: &'static str, outcome: CompensationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"rabbitmq_broker_rollback_total",
			"compensation" => label,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (label, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_installed_recorder() {
		record_workflow_outcome(WorkflowKind::CreateInstance, WorkflowOutcome::Failure);
		record_compensation("delete_vhost", CompensationOutcome::Failed);
	}
}
