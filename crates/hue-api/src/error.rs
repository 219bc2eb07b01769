use thiserror::Error;

/// Top-level error type for the `hue-api` crate.
///
/// Covers every failure mode across the bridge API surfaces:
/// transport, pairing, CLIP v2 resource access, and the event stream.
/// `hue-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bridge rejected the application key (HTTP 403).
    #[error("Client is not authenticated with the bridge")]
    Forbidden,

    // ── Pairing ─────────────────────────────────────────────────────
    /// The bridge refused the pairing request with a business error,
    /// typically because the link button has not been pressed yet.
    #[error("Pairing refused by bridge: {description}")]
    Registration { description: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── CLIP v2 ─────────────────────────────────────────────────────
    /// Non-success HTTP status from the bridge, with the first error
    /// description found in the response envelope (if any).
    #[error("Bridge error (HTTP {status}): {message}")]
    Bridge { status: u16, message: String },

    // ── Event stream ────────────────────────────────────────────────
    /// The event stream connection failed or broke mid-read.
    #[error("Event stream error: {0}")]
    EventStream(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response decoded, but its shape violates the protocol
    /// (empty registration array, neither `error` nor `success`, ...).
    #[error("Invalid response received from bridge: {message}")]
    InvalidResponse { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the bridge rejected the credential.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// Returns `true` if pairing failed only because the physical link
    /// button has not been pressed -- retrying after a press may succeed.
    pub fn is_link_button_required(&self) -> bool {
        matches!(self, Self::Registration { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Bridge { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for protocol violations and undecodable bodies.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::InvalidResponse { .. } | Self::Deserialization { .. }
        )
    }

    pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Self {
        let preview = &body[..floor_char_boundary(body, 200)];
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}

/// Largest index `<= max` that falls on a UTF-8 boundary of `s`.
pub(crate) fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
