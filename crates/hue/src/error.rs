//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hue_config::ConfigError;
use hue_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to bridge at {url}")]
    #[diagnostic(
        code(hue::connection_failed),
        help(
            "Check that the bridge is powered and reachable.\n\
             Reason: {reason}\n\
             Bridges use a self-signed certificate; try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Event stream closed by the bridge")]
    #[diagnostic(
        code(hue::stream_closed),
        help("The bridge ended the connection. Run the command again to reconnect.")
    )]
    StreamClosed,

    // ── Authentication ───────────────────────────────────────────────

    #[error("The bridge rejected the application key")]
    #[diagnostic(
        code(hue::forbidden),
        help(
            "The key for profile '{profile}' is unknown to this bridge.\n\
             Press the link button, then run: hue pair --save"
        )
    )]
    Forbidden { profile: String },

    #[error("Pairing refused: {message}")]
    #[diagnostic(
        code(hue::link_button),
        help("Press the round link button on the bridge, then run this command again.")
    )]
    LinkButtonNotPressed { message: String },

    #[error("No application key configured for profile '{profile}'")]
    #[diagnostic(
        code(hue::no_credentials),
        help(
            "Pair with: hue pair --save\n\
             Or set the HUE_APP_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Resource '{identifier}' not found")]
    #[diagnostic(
        code(hue::not_found),
        help("Run: hue resources list to see available resources")
    )]
    NotFound { identifier: String },

    // ── Bridge ───────────────────────────────────────────────────────

    #[error("Bridge error{}: {message}", .status.map_or_else(String::new, |s| format!(" ({s})")))]
    #[diagnostic(code(hue::api_error))]
    Api { message: String, status: Option<u16> },

    #[error("Unexpected response from bridge: {message}")]
    #[diagnostic(
        code(hue::protocol),
        help("Check that the address points at a Hue bridge with the CLIP v2 API.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hue::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hue::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hue config set bridge <address> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No bridge configured")]
    #[diagnostic(
        code(hue::no_config),
        help(
            "Pass --bridge <address>, or save one with: hue config set bridge <address>\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hue::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(hue::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::StreamClosed => exit_code::CONNECTION,
            Self::Forbidden { .. } | Self::LinkButtonNotPressed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Forbidden => CliError::Forbidden {
                profile: "current".into(),
            },
            CoreError::LinkButtonNotPressed { message } => CliError::LinkButtonNotPressed { message },
            CoreError::Protocol { message } => CliError::Protocol { message },
            CoreError::NotFound { identifier } => CliError::NotFound { identifier },
            CoreError::Api { message, status } => CliError::Api { message, status },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::WatcherClosed => CliError::StreamClosed,
        }
    }
}

impl From<hue_api::Error> for CliError {
    fn from(err: hue_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
