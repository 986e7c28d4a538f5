//! Data preparation.
//!
//! - rank transform of raw replicate scores (`ranks`)
//! - seeded synthetic samples from each family (`sample`)

pub mod ranks;
pub mod sample;

pub use ranks::*;
pub use sample::*;
