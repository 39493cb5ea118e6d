//! Exit quoting and submission.
//!
//! [`ExitHandler`] turns an [`exit_types::ExitParams`] into a quote by
//! delegating to the pool SDK, and submits the resulting transaction
//! through the delivery service.

mod error;
mod handler;

pub use error::ExitError;
pub use handler::{ExitHandler, MAX_SLIPPAGE_BPS};
