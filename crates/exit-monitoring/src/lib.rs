//! Observability for the exit service.
//!
//! - `sink`: exception capture for failures in external dependencies
//! - `tracing`: subscriber initialisation
//!
//! Failures in the pool SDK are reported to an [`sink::ExceptionSink`] tagged
//! with the dependency that raised them, independently of how the error is
//! surfaced to the caller.

pub mod sink;
pub mod tracing;

pub use sink::{
	CaptureContext, CapturedException, ExceptionSink, RecordingExceptionSink, TracingExceptionSink,
};
pub use self::tracing::{init_tracing, TracingConfig, TracingError};
