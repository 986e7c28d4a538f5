//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - generate log-spaced θ grids over each family's feasible interval
//! - minimise the negative diagonal log-likelihood (grid scan + Brent)
//! - fit several families and select one by BIC

pub mod dmle;
pub mod grid;
pub mod selection;

pub use dmle::*;
pub use grid::*;
pub use selection::*;
