// Bridge HTTP client
//
// Wraps `reqwest::Client` with CLIP v2 URL construction, application-key
// injection, and `{ errors, data }` envelope unwrapping. Endpoint groups
// (pairing, resources, event stream) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::RwLock;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::APP_KEY_HEADER;
use crate::error::{Error, floor_char_boundary};
use crate::model::ApiResponse;
use crate::transport::TransportConfig;

pub const REGISTRATION_PATH: &str = "/api";
pub const RESOURCE_PATH: &str = "/clip/v2/resource";
pub const EVENT_STREAM_PATH: &str = "/eventstream/clip/v2";

/// Raw HTTP client for a Hue bridge.
///
/// Authenticated methods send the application key set through
/// [`set_app_key`](Self::set_app_key) or obtained by
/// [`register`](Self::register). Without a key the request still goes out
/// and the bridge answers with [`Error::Forbidden`].
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    app_key: RwLock<Option<SecretString>>,
}

impl BridgeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the bridge root, e.g. `https://192.168.1.20`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            app_key: RwLock::new(None),
        })
    }

    /// Create a client for a bare host or `host:port`, over HTTPS.
    pub fn for_host(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("https://{host}"))?;
        Self::new(base_url, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
            app_key: RwLock::new(None),
        }
    }

    /// Builder-style variant of [`set_app_key`](Self::set_app_key).
    pub fn with_app_key(self, key: SecretString) -> Self {
        self.set_app_key(key);
        self
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Application key ──────────────────────────────────────────────

    pub fn set_app_key(&self, key: SecretString) {
        debug!("storing application key");
        *self
            .app_key
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(key);
    }

    /// The current application key, if any.
    pub fn app_key(&self) -> Option<SecretString> {
        self.app_key
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Attach the application key header, if one is configured.
    pub(crate) fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .app_key
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(key) => builder.header(APP_KEY_HEADER, key.expose_secret()),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an absolute API path, e.g. `/clip/v2/resource`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// `{base}/clip/v2/resource/{type}/{id}`, with both segments escaped.
    pub(crate) fn resource_url(&self, resource_type: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.url(RESOURCE_PATH)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(resource_type)
            .push(id);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned + Default>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .authorize(self.http.get(url))
            .timeout(self.timeout)
            .send()
            .await?;

        parse_envelope(resp).await
    }

    /// Send an authenticated PUT with a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned + Default>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .authorize(self.http.put(url).json(body))
            .timeout(self.timeout)
            .send()
            .await?;

        parse_envelope(resp).await
    }

    /// Send an unauthenticated POST with a JSON body, returning the raw body.
    pub(crate) async fn post_raw(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }
}

/// Map HTTP failure statuses to typed errors, passing successful responses through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Forbidden);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|env| env.first_error().map(String::from))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_owned()
                } else {
                    trimmed[..floor_char_boundary(trimmed, 200)].to_owned()
                }
            });
        return Err(Error::Bridge {
            status: status.as_u16(),
            message,
        });
    }

    Ok(resp)
}

/// Parse the `{ errors, data }` envelope, returning `data`.
async fn parse_envelope<T: DeserializeOwned + Default>(resp: reqwest::Response) -> Result<T, Error> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;

    let envelope: ApiResponse<T> =
        serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

    if let Some(desc) = envelope.first_error() {
        // Partial failures (HTTP 207) still carry usable data.
        trace!(error = desc, "bridge reported errors alongside data");
    }

    Ok(envelope.data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BridgeClient {
        BridgeClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = client("http://127.0.0.1:8080/");
        assert_eq!(
            c.url(RESOURCE_PATH).unwrap().as_str(),
            "http://127.0.0.1:8080/clip/v2/resource"
        );
    }

    #[test]
    fn resource_url_escapes_segments() {
        let c = client("https://bridge.local");
        assert_eq!(
            c.resource_url("light", "a b/c").unwrap().as_str(),
            "https://bridge.local/clip/v2/resource/light/a%20b%2Fc"
        );
    }

    #[test]
    fn for_host_uses_https() {
        let c = BridgeClient::for_host("192.168.1.20", &TransportConfig::insecure()).unwrap();
        assert_eq!(c.base_url().as_str(), "https://192.168.1.20/");
    }

    #[test]
    fn app_key_round_trip() {
        let c = client("https://bridge.local");
        assert!(c.app_key().is_none());
        c.set_app_key(SecretString::from("k".to_string()));
        assert_eq!(c.app_key().unwrap().expose_secret(), "k");
    }
}
