//! Numerical building blocks: stable log-space sums, the Eulerian-number
//! polylogarithm, and the special functions used by the Gumbel density.

pub mod logspace;
pub mod polylog;
pub mod special;

pub use logspace::*;
pub use polylog::*;
pub use special::*;
