// ── Runtime connection configuration ──
//
// Describes *how* to reach a bridge: base URL, application key, TLS policy.
// Never touches disk; the CLI builds one from a profile and hands it in.

use std::time::Duration;

use hue_api::transport::{TlsMode, TransportConfig};
use hue_api::BridgeClient;
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file, e.g. the Hue root CA.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Bridges present a self-signed certificate
    /// without an IP SAN, so this is common on a LAN.
    DangerAcceptInvalid,
}

/// Connection parameters for one bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub url: Url,
    /// `None` until paired.
    pub app_key: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl BridgeConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            app_key: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Transport settings for `hue-api`.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }

    /// Build a client, pre-loaded with the application key if one is set.
    pub fn client(&self) -> Result<BridgeClient, CoreError> {
        let client = BridgeClient::new(self.url.clone(), &self.transport())?;
        if let Some(key) = &self.app_key {
            client.set_app_key(key.clone());
        }
        Ok(client)
    }
}
