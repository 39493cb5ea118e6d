//! Exception capture.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Mutex;

/// Metadata attached to a captured exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureContext {
	/// Name of the external dependency that failed, e.g. `"pool-sdk"`.
	pub dependency: String,
	/// Operation that was in flight.
	pub operation: String,
	pub extra: BTreeMap<String, String>,
}

impl CaptureContext {
	pub fn new(dependency: impl Into<String>, operation: impl Into<String>) -> Self {
		Self {
			dependency: dependency.into(),
			operation: operation.into(),
			extra: BTreeMap::new(),
		}
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.extra.insert(key.into(), value.to_string());
		self
	}
}

/// Fire-and-forget sink for errors raised by external dependencies.
///
/// Implementations must not fail or block; capture is purely observational.
pub trait ExceptionSink: Send + Sync {
	fn capture(&self, error: &(dyn Error + Send + Sync), context: &CaptureContext);
}

/// Sink that emits captured exceptions as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExceptionSink;

impl ExceptionSink for TracingExceptionSink {
	fn capture(&self, error: &(dyn Error + Send + Sync), context: &CaptureContext) {
		tracing::error!(
			dependency = %context.dependency,
			operation = %context.operation,
			extra = ?context.extra,
			error = %error,
			"Captured exception from external dependency"
		);
	}
}

/// A captured exception as stored by [`RecordingExceptionSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedException {
	pub message: String,
	pub context: CaptureContext,
}

/// Sink that keeps every captured exception in memory.
#[derive(Debug, Default)]
pub struct RecordingExceptionSink {
	captured: Mutex<Vec<CapturedException>>,
}

impl RecordingExceptionSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn captured(&self) -> Vec<CapturedException> {
		match self.captured.lock() {
			Ok(captured) => captured.clone(),
			Err(poisoned) => poisoned.into_inner().clone(),
		}
	}
}

impl ExceptionSink for RecordingExceptionSink {
	fn capture(&self, error: &(dyn Error + Send + Sync), context: &CaptureContext) {
		let entry = CapturedException {
			message: error.to_string(),
			context: context.clone(),
		};
		match self.captured.lock() {
			Ok(mut captured) => captured.push(entry),
			Err(poisoned) => poisoned.into_inner().push(entry),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, thiserror::Error)]
	#[error("boom")]
	struct Boom;

	#[test]
	fn test_recording_sink_keeps_context() {
		let sink = RecordingExceptionSink::new();
		let context = CaptureContext::new("pool-sdk", "build_exit").with_extra("pool_id", "0xabc");

		sink.capture(&Boom, &context);
		TracingExceptionSink.capture(&Boom, &context);

		let captured = sink.captured();
		assert_eq!(captured.len(), 1);
		assert_eq!(captured[0].message, "boom");
		assert_eq!(captured[0].context.dependency, "pool-sdk");
		assert_eq!(captured[0].context.extra["pool_id"], "0xabc");
	}
}
