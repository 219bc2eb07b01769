// Pairing endpoint
//
// `POST /api` is the only unauthenticated call. On success the returned
// application key is stored on the client so subsequent CLIP v2 calls are
// authorized.

use secrecy::SecretString;
use tracing::{debug, info};

use crate::auth::{AppCredentials, RegistrationRequest, RegistrationResponse, interpret_registration};
use crate::client::{BridgeClient, REGISTRATION_PATH};
use crate::error::Error;

impl BridgeClient {
    /// Request an application key from the bridge.
    ///
    /// `device_type` is a free-form label such as `"huesync#laptop"`. Fails
    /// with [`Error::Registration`] until the link button has been pressed.
    pub async fn register(&self, device_type: &str) -> Result<AppCredentials, Error> {
        let url = self.url(REGISTRATION_PATH)?;
        let request = RegistrationRequest {
            device_type: device_type.to_owned(),
            generate_client_key: true,
        };

        let body = self.post_raw(url, &request).await?;
        let responses: Vec<RegistrationResponse> =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

        let success = match interpret_registration(responses) {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "pairing refused");
                return Err(e);
            }
        };

        info!(device_type, "paired with bridge");
        let app_key = SecretString::from(success.username);
        self.set_app_key(app_key.clone());

        Ok(AppCredentials {
            app_key,
            client_key: success.clientkey.map(SecretString::from),
        })
    }
}
