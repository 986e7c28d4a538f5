//! `midr` library crate.
//!
//! Archimedean copula engine (Clayton, Frank, Gumbel) for measuring the
//! reproducibility of replicate experiments. The binary (`midr`) is a thin
//! wrapper around this library so that:
//!
//! - the numeric core is testable without spawning processes
//! - the density and estimation routines can be embedded elsewhere

pub mod app;
pub mod cli;
pub mod copula;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
