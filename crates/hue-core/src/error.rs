// ── Core error types ──
//
// User-facing errors from hue-core. Consumers never see HTTP status codes
// or raw JSON failures; the `From<hue_api::Error>` impl folds transport
// errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to bridge at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Bridge rejected the application key")]
    Forbidden,

    #[error("Pairing refused: {message} -- press the link button and retry")]
    LinkButtonNotPressed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Bridge sent an invalid response: {message}")]
    Protocol { message: String },

    #[error("Resource not found: {identifier}")]
    NotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Bridge error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Watcher is closed")]
    WatcherClosed,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hue_api::Error> for CoreError {
    fn from(err: hue_api::Error) -> Self {
        match err {
            hue_api::Error::Forbidden => CoreError::Forbidden,
            hue_api::Error::Registration { description } => {
                CoreError::LinkButtonNotPressed {
                    message: description,
                }
            }
            hue_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound { identifier: url }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hue_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hue_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hue_api::Error::Bridge {
                status: 404,
                message,
            } => CoreError::NotFound {
                identifier: message,
            },
            hue_api::Error::Bridge { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            hue_api::Error::EventStream(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Event stream failed: {reason}"),
            },
            hue_api::Error::InvalidResponse { message }
            | hue_api::Error::Deserialization { message, body: _ } => {
                CoreError::Protocol { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_maps_to_link_button() {
        let err: CoreError = hue_api::Error::Registration {
            description: "button has not been pressed".into(),
        }
        .into();
        assert!(matches!(err, CoreError::LinkButtonNotPressed { .. }));
        assert!(err.to_string().contains("button has not been pressed"));
    }

    #[test]
    fn bridge_404_maps_to_not_found() {
        let err: CoreError = hue_api::Error::Bridge {
            status: 404,
            message: "Not Found".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { .. }));

        let err: CoreError = hue_api::Error::Bridge {
            status: 405,
            message: "Method Not Allowed".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(405), .. }));
    }

    #[test]
    fn malformed_bodies_are_protocol_errors() {
        let err: CoreError = hue_api::Error::InvalidResponse {
            message: "empty registration response".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Protocol { .. }));
    }
}
