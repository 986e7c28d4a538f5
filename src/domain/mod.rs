//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the copula family tag (`Family`) and the CLI family selector (`FamilySpec`)
//! - the validated pseudo-observation matrix (`PseudoObservations`)
//! - per-command configuration (`FitConfig`, `DensityConfig`, `SimulateConfig`) and serializable fit outputs (`FamilyFit`, `FitSummary`)

pub mod types;

pub use types::*;
