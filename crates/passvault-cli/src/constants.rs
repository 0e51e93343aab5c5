//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, user, record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase or tampered secret).
    pub const AUTH_FAILED: i32 = 5;

    /// A stored token or profile could not be parsed.
    pub const CORRUPTED_DATA: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "PASSVAULT_CONFIG";
    pub const DATABASE: &str = "PASSVAULT_DB";
    pub const USER: &str = "PASSVAULT_USER";
    pub const PASSPHRASE: &str = "PASSVAULT_PASSPHRASE";
    pub const LOG: &str = "PASSVAULT_LOG";
}

/// Import file used when neither `--file` nor the config names one.
pub const DEFAULT_IMPORT_FILE: &str = "import/passwords.txt";
