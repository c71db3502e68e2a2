//! ddp Trigger
//!
//! Starts exactly one workflow execution for a validated object. The
//! execution receives `{"bucket": ..., "key": ...}` as its input and runs
//! independently; starting it does not wait for completion.

mod error;
mod input;
mod trigger;

pub use error::TriggerError;
pub use input::{ExecutionInput, execution_name};
pub use trigger::{ExecutionNaming, ExecutionTrigger};
