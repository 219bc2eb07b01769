#![allow(clippy::unwrap_used)]
// Integration tests for `BridgeClient` using wiremock.

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hue_api::model::{TYPE_LIGHT, decode_frame};
use hue_api::{APP_KEY_HEADER, BridgeClient, Error, Resource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BridgeClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn key(k: &str) -> SecretString {
    SecretString::from(k.to_string())
}

// ── Pairing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_register_success_stores_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({ "devicetype": "huesync#test", "generateclientkey": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "s3cr3t", "clientkey": "ABCD" } }
        ])))
        .mount(&server)
        .await;

    let creds = client.register("huesync#test").await.unwrap();

    assert_eq!(creds.app_key.expose_secret(), "s3cr3t");
    assert_eq!(creds.client_key.unwrap().expose_secret(), "ABCD");
    assert_eq!(client.app_key().unwrap().expose_secret(), "s3cr3t");
}

#[tokio::test]
async fn test_register_link_button_not_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let result = client.register("huesync#test").await;

    assert!(
        matches!(result, Err(Error::Registration { ref description }) if description == "link button not pressed"),
        "expected Registration error, got: {result:?}"
    );
    assert!(client.app_key().is_none());
}

#[tokio::test]
async fn test_register_empty_array_is_protocol_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client.register("huesync#test").await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_register_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = client.register("huesync#test").await.unwrap_err();
    assert!(err.is_protocol(), "got: {err:?}");
}

// ── Resource tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_resources_sends_app_key() {
    let (server, client) = setup().await;
    client.set_app_key(key("username"));

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource"))
        .and(header(APP_KEY_HEADER, "username"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [
                { "id": "l1", "type": "light", "on": { "on": true }, "dimming": { "brightness": 80.0 } },
                { "id": "z1", "type": "zone", "metadata": { "name": "Upstairs" } }
            ]
        })))
        .mount(&server)
        .await;

    let resources = client.resources().await.unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].id, "l1");
    assert_eq!(resources[0].is_on(), Some(true));
    assert_eq!(resources[1].name(), Some("Upstairs"));
}

#[tokio::test]
async fn test_resources_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.resources().await.unwrap_err();
    assert!(err.is_forbidden(), "got: {err:?}");
}

#[tokio::test]
async fn test_resources_wrong_shape_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "x" } })))
        .mount(&server)
        .await;

    let err = client.resources().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_update_puts_patch() {
    let (server, client) = setup().await;
    client.set_app_key(key("username"));

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/l1"))
        .and(header(APP_KEY_HEADER, "username"))
        .and(body_json(json!({ "on": { "on": true } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "rid": "l1", "rtype": "light" }]
        })))
        .mount(&server)
        .await;

    let refs = client
        .update(TYPE_LIGHT, "l1", &Resource::switch_on())
        .await
        .unwrap();

    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].rid, "l1");
}

#[tokio::test]
async fn test_update_not_found_carries_bridge_message() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "description": "Not Found" }],
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client
        .update(TYPE_LIGHT, "missing", &Resource::switch_on())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("Not Found"), "got: {err}");
}

// ── Event stream tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_event_stream_yields_frames() {
    let (server, client) = setup().await;
    client.set_app_key(key("username"));

    let body = concat!(
        ": hi\n\n",
        "id: 1:0\n",
        "data: [{\"type\":\"update\",\"data\":[{\"id\":\"l1\",\"type\":\"light\",\"on\":{\"on\":true}}]}]\n\n",
        "id: 2:0\n",
        "data: not json\n\n",
    );

    Mock::given(method("GET"))
        .and(path("/eventstream/clip/v2"))
        .and(header("accept", "text/event-stream"))
        .and(header(APP_KEY_HEADER, "username"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let frames: Vec<_> = client.event_stream().await.unwrap().collect().await;

    assert_eq!(frames.len(), 2);
    let first = frames[0].as_ref().unwrap();
    assert_eq!(first.id.as_deref(), Some("1:0"));
    let batches = decode_frame(&first.data).unwrap();
    assert_eq!(batches[0].data[0].id, "l1");

    // Framing succeeds; decoding is the consumer's problem.
    let second = frames[1].as_ref().unwrap();
    assert!(decode_frame(&second.data).is_err());
}

#[tokio::test]
async fn test_event_stream_forbidden_fails_up_front() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/eventstream/clip/v2"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.event_stream().await;
    assert!(matches!(result, Err(Error::Forbidden)));
}
