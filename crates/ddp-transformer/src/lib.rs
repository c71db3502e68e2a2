//! ddp Transformer
//!
//! The conversion step run by the workflow: read the source object, rewrite
//! it from comma-delimited to tab-delimited, and write the result to the
//! destination container under a `.tsv` key. The source object is never
//! modified.

mod error;
mod request;
mod transformer;

pub use error::TransformError;
pub use request::ConversionRequest;
pub use transformer::{ContentTransformer, ConversionResult};
