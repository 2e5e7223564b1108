//! Exit codes for newsdeskctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when at least one status endpoint could not be read
pub const EXIT_BACKEND_UNAVAILABLE: i32 = 69;

/// Exit code when the configuration file is missing or invalid
pub const EXIT_CONFIG_ERROR: i32 = 78;
