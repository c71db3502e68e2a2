//! ddp Tabular
//!
//! Pure functions over comma-delimited payloads: the structural header check
//! run before a workflow is started, and the comma-to-tab conversion run as a
//! workflow step. Nothing in this crate touches storage or the network.

mod convert;
mod key;
mod validate;

pub use convert::{ConvertError, Converted, comma_to_tab};
pub use key::{KeyRewrite, destination_key};
pub use validate::{FormatValidator, ValidationOutcome};
