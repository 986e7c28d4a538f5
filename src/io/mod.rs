//! Input/output helpers.
//!
//! - delimited matrix ingest (`ingest`)
//! - density tables, sampled matrices and the summary JSON (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
