//! Error types.
//!
//! - [`CopulaError`] is returned by the numeric core (library API).
//! - [`AppError`] is what the `midr` binary reports; it carries a process exit code.

use thiserror::Error;

/// Errors raised by the copula engine.
///
/// Only structurally invalid input is an error. A log-density of `-inf`
/// (zero density) is a result, and a failed estimate is reported as NaN by
/// `dmle`, not through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CopulaError {
    /// Log of a non-positive value, or a pseudo-observation outside (0, 1).
    #[error("domain error: {0}")]
    Domain(String),

    /// Matrix shape unusable by the engine (empty, ragged, too few columns).
    #[error("shape error: {0}")]
    Shape(String),

    /// Dependence parameter outside the domain required by a formula.
    #[error("invalid parameter for {family}: theta={theta} ({reason})")]
    Parameter {
        family: &'static str,
        theta: f64,
        reason: &'static str,
    },

    /// Runtime failure inside the scalar optimizer.
    #[error("optimizer error: {0}")]
    Optimizer(String),
}

impl CopulaError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CopulaError> for AppError {
    fn from(err: CopulaError) -> Self {
        let exit_code = match err {
            CopulaError::Domain(_) | CopulaError::Shape(_) | CopulaError::Parameter { .. } => 2,
            CopulaError::Optimizer(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
