// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::WorkflowKind};

/// A span builder used by broker workflows.
#[derive(Clone, Debug)]
pub struct WorkflowSpan {
	span: tracing::Span,
}
impl WorkflowSpan {
	/// Creates a new span tagged with the workflow kind and target instance.
	pub fn new(kind: WorkflowKind, instance: &str) -> Self {
		let span = tracing::info_span!("rabbitmq_broker.workflow", workflow = kind.as_str(), instance);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::{WorkflowKind, WorkflowSpan};

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = WorkflowSpan::new(WorkflowKind::HealthCheck, "foobar");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
