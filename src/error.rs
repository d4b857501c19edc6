//! Error types for the kiln CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Every error is fatal to the run: the pipeline is a linear chain and the
//! first failing stage aborts all subsequent stages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for kiln operations.
///
/// Each variant corresponds to one pipeline stage, so the failing stage is
/// always identifiable from the error alone.
#[derive(Error, Debug)]
pub enum KilnError {
    /// Bad or missing inputs: wrong arguments, nonexistent paths, invalid config.
    #[error("{0}")]
    Usage(String),

    /// The template engine failed to render the scaffold.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The generated manifest did not have the expected shape.
    #[error("Patch failed: {0}")]
    Patch(String),

    /// Dependency locking or installation failed.
    #[error("Install failed: {0}")]
    Install(String),

    /// The generated library directory could not be identified.
    #[error("Library discovery failed: {0}")]
    Discovery(String),

    /// A quality-gate tool failed.
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl KilnError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            KilnError::Usage(_) => exit_codes::USAGE_ERROR,
            KilnError::Generation(_) => exit_codes::GENERATION_FAILURE,
            KilnError::Patch(_) => exit_codes::PATCH_FAILURE,
            KilnError::Install(_) => exit_codes::INSTALL_FAILURE,
            KilnError::Discovery(_) => exit_codes::DISCOVERY_FAILURE,
            KilnError::Verification(_) => exit_codes::VERIFICATION_FAILURE,
        }
    }
}

/// Result type alias for kiln operations.
pub type Result<T> = std::result::Result<T, KilnError>;
