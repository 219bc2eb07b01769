// Pairing and application-key types.
//
// The bridge issues an application key ("username" in its wire format) once
// the physical link button has been pressed. Every authenticated request
// then carries that key in the `hue-application-key` header.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Header carrying the application key on authenticated requests.
pub const APP_KEY_HEADER: &str = "hue-application-key";

/// Body of `POST /api`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(rename = "devicetype")]
    pub device_type: String,
    #[serde(rename = "generateclientkey", default)]
    pub generate_client_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationError {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSuccess {
    pub username: String,
    /// Entertainment streaming key, returned when `generateclientkey` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientkey: Option<String>,
}

/// One element of the `POST /api` response array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RegistrationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<RegistrationSuccess>,
}

impl RegistrationResponse {
    pub fn success(username: impl Into<String>) -> Self {
        Self {
            error: None,
            success: Some(RegistrationSuccess {
                username: username.into(),
                clientkey: None,
            }),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            error: Some(RegistrationError {
                description: description.into(),
            }),
            success: None,
        }
    }
}

/// Credentials obtained through pairing.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_key: SecretString,
    pub client_key: Option<SecretString>,
}

/// Interpret a decoded `POST /api` response.
///
/// Only the first element matters. An `error` member wins over `success`;
/// an empty array or an element with neither member is a protocol error.
pub fn interpret_registration(
    responses: Vec<RegistrationResponse>,
) -> Result<RegistrationSuccess, Error> {
    let Some(first) = responses.into_iter().next() else {
        return Err(Error::InvalidResponse {
            message: "empty registration response".into(),
        });
    };
    if let Some(err) = first.error {
        return Err(Error::Registration {
            description: err.description,
        });
    }
    first.success.ok_or_else(|| Error::InvalidResponse {
        message: "registration response has neither error nor success".into(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_bridge_field_names() {
        let req = RegistrationRequest {
            device_type: "huesync#laptop".into(),
            generate_client_key: true,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "devicetype": "huesync#laptop", "generateclientkey": true })
        );
    }

    #[test]
    fn success_yields_username() {
        let resp: Vec<RegistrationResponse> = serde_json::from_value(json!([
            { "success": { "username": "abc", "clientkey": "0123" } }
        ]))
        .unwrap();
        let ok = interpret_registration(resp).unwrap();
        assert_eq!(ok.username, "abc");
        assert_eq!(ok.clientkey.as_deref(), Some("0123"));
    }

    #[test]
    fn error_is_business_error() {
        let resp = vec![RegistrationResponse::error("link button not pressed")];
        let err = interpret_registration(resp).unwrap_err();
        assert!(err.is_link_button_required());
        assert!(err.to_string().contains("link button not pressed"));
    }

    #[test]
    fn empty_array_is_protocol_error() {
        let err = interpret_registration(Vec::new()).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn neither_member_is_protocol_error() {
        let err = interpret_registration(vec![RegistrationResponse::default()]).unwrap_err();
        assert!(err.is_protocol());
    }
}
