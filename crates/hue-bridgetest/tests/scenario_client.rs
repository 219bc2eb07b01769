//! `BridgeClient` against a live `FakeBridge` over loopback HTTP.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures_util::StreamExt;
use hue_api::model::{Dimming, Resource, StreamBatch, TYPE_LIGHT, decode_frame};
use hue_api::{BridgeClient, Error, EventFrame, EventStream, TransportConfig};
use hue_bridgetest::{FakeBridge, USERNAME};
use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};

const FAKE_ID: &str = "id";
const FAKE_TYPE: &str = "type";

async fn setup() -> (FakeBridge, BridgeClient) {
    let bridge = FakeBridge::start().await.unwrap();
    let client = BridgeClient::new(bridge.url(), &TransportConfig::default()).unwrap();
    (bridge, client)
}

fn authenticate(client: &BridgeClient) {
    client.set_app_key(SecretString::from(USERNAME.to_string()));
}

async fn next_frame(frames: &mut EventStream) -> EventFrame {
    tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn register_without_button_press() {
    let (_bridge, client) = setup().await;
    let err = client.register("").await.unwrap_err();
    assert!(err.is_link_button_required(), "got: {err:?}");
}

#[tokio::test]
async fn register_with_only_button_press() {
    let (bridge, client) = setup().await;
    bridge.press_button();
    let err = client.register("").await.unwrap_err();
    assert!(err.is_link_button_required(), "got: {err:?}");
}

#[tokio::test]
async fn register_with_call_and_button_press() {
    let (bridge, client) = setup().await;

    assert!(client.register("").await.is_err());
    bridge.press_button();
    let creds = client.register("").await.unwrap();

    assert_eq!(creds.app_key.expose_secret(), USERNAME);
    assert_eq!(client.app_key().unwrap().expose_secret(), USERNAME);

    // A second pairing after activation also succeeds.
    assert!(client.register("").await.is_ok());
}

// ── Credential gate ─────────────────────────────────────────────────

#[tokio::test]
async fn unauthenticated_request() {
    let (_bridge, client) = setup().await;
    let err = client.resources().await.unwrap_err();
    assert!(matches!(err, Error::Forbidden), "got: {err:?}");
}

#[tokio::test]
async fn wrong_key_is_forbidden() {
    let (_bridge, client) = setup().await;
    client.set_app_key(SecretString::from("not-the-key".to_string()));
    assert!(client.resources().await.unwrap_err().is_forbidden());
}

#[tokio::test]
async fn authenticated_request() {
    let (_bridge, client) = setup().await;
    authenticate(&client);
    assert!(client.resources().await.unwrap().is_empty());
}

// ── Updates ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_resource() {
    let (bridge, client) = setup().await;
    authenticate(&client);
    bridge.add_resource(Resource::new(FAKE_ID, FAKE_TYPE));

    client
        .update(FAKE_TYPE, FAKE_ID, &Resource::switch_on())
        .await
        .unwrap();

    let r = bridge.resource(FAKE_ID).unwrap();
    assert_eq!(r.is_on(), Some(true));
}

#[tokio::test]
async fn update_unknown_resource_is_not_found() {
    let (_bridge, client) = setup().await;
    authenticate(&client);

    let err = client
        .update(TYPE_LIGHT, "missing", &Resource::switch_on())
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

// ── Event stream ────────────────────────────────────────────────────

#[tokio::test]
async fn event_stream_delivers_published_and_update_frames() {
    let (bridge, client) = setup().await;
    authenticate(&client);
    bridge.add_resource(Resource::new(FAKE_ID, TYPE_LIGHT));

    let mut frames = client.event_stream().await.unwrap();
    assert_eq!(bridge.subscriber_count(), 1);

    bridge.publish(&[StreamBatch::update(vec![Resource::with_brightness(42.0)])]);
    client
        .update(TYPE_LIGHT, FAKE_ID, &Resource::switch_on())
        .await
        .unwrap();

    let first = decode_frame(&next_frame(&mut frames).await.data).unwrap();
    assert_eq!(first[0].data[0].dimming, Some(Dimming { brightness: 42.0 }));

    let second = decode_frame(&next_frame(&mut frames).await.data).unwrap();
    assert_eq!(second[0].kind, "update");
    assert_eq!(second[0].data[0].id, FAKE_ID);
    assert_eq!(second[0].data[0].is_on(), Some(true));
}

#[tokio::test]
async fn event_stream_requires_key() {
    let (_bridge, client) = setup().await;
    assert!(matches!(client.event_stream().await, Err(Error::Forbidden)));
}

#[tokio::test]
async fn shutdown_ends_open_event_streams() {
    let (bridge, client) = setup().await;
    authenticate(&client);
    let mut frames = client.event_stream().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), bridge.shutdown())
        .await
        .unwrap();

    let rest = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(item) = frames.next().await {
            if item.is_err() {
                break;
            }
        }
    })
    .await;
    assert!(rest.is_ok(), "stream did not end after shutdown");
}
