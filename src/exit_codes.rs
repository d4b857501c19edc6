//! Exit code constants for the kiln CLI.
//!
//! One code per pipeline stage so callers can tell the failing stage apart
//! without parsing stderr:
//! - 0: Success
//! - 1: Usage error (bad args, bad paths, bad config)
//! - 2: Generation failure (template rendering)
//! - 3: Patch failure (manifest shape unexpected)
//! - 4: Install failure (dependency lock/install)
//! - 5: Discovery failure (library directory not identifiable)
//! - 6: Verification failure (a quality gate exited non-zero)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Usage error: bad arguments, nonexistent input paths, or invalid config.
pub const USAGE_ERROR: i32 = 1;

/// Generation failure: the template engine reported an error.
pub const GENERATION_FAILURE: i32 = 2;

/// Patch failure: the generated manifest lacked the expected dependency entry.
pub const PATCH_FAILURE: i32 = 3;

/// Install failure: dependency locking or installation failed.
pub const INSTALL_FAILURE: i32 = 4;

/// Discovery failure: zero or multiple candidate library directories.
pub const DISCOVERY_FAILURE: i32 = 5;

/// Verification failure: a quality-gate tool exited non-zero.
pub const VERIFICATION_FAILURE: i32 = 6;
