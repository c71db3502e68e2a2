//! ddp Config
//!
//! This crate contains the serializable pipeline configuration for ddp.
//! The configuration names the fixed values the pipeline is built around:
//! the source container to watch, the destination container for converted
//! objects, and the workflow to start for each valid object.
//!
//! Configuration is loaded from a JSON file and validated once at startup:
//!
//! ```json
//! {
//!   "source_container": "ddpsourcebucket",
//!   "destination_container": "ddpdestinationbucket",
//!   "workflow_name": "sfn_state_machine"
//! }
//! ```

mod error;
mod pipeline;

pub use error::ConfigError;
pub use pipeline::{ConversionMode, PipelineConfig};
