//! ddp Dispatcher
//!
//! Entry point for object-creation notifications. For every record in a
//! notification the dispatcher:
//!
//! 1. Extracts the container and key, skipping malformed records
//! 2. Skips records from any container other than the configured source
//! 3. Reads the object's header line and validates it
//! 4. Resolves the configured workflow by name
//! 5. Starts one execution with the object's container and key as input
//!
//! Records are isolated from each other: a failure in one record never stops
//! the others, but is reflected in the [`BatchReport`] so the invocation as a
//! whole can be marked failed.

mod dispatcher;
mod error;
mod event;
mod report;

pub use dispatcher::EventDispatcher;
pub use error::DispatchError;
pub use event::{
  BucketEntity, EventRecord, IncomingObject, Malformed, Notification, ObjectEntity, S3Entity,
};
pub use report::{BatchReport, RecordOutcome, RecordSummary, ReportSummary, SkipReason};
