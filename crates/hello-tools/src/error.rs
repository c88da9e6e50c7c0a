//! Error Types for the hello tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

/// Argument faults for the die roller and prime checker.
///
/// The calculator never faults; see [`crate::svckit::CalcError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("sides must be a positive integer, got {0}")]
    InvalidSides(String),

    #[error("{0} is not an integer")]
    NotAnInteger(String),

    #[error("expected a list of numbers, got {0}")]
    NotAList(String),
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        Self::ToolValidation(err.to_string())
    }
}
