// hue-api: Async Rust client for the Philips Hue bridge CLIP v2 API.
//
// Covers pairing (`POST /api`), the resource collection, per-resource
// partial updates, and the server-sent event stream. The resource model
// and its merge-patch rules live in [`model`].

pub mod auth;
pub mod client;
pub mod error;
pub mod eventstream;
pub mod model;
pub mod pairing;
pub mod resources;
pub mod transport;

pub use auth::{APP_KEY_HEADER, AppCredentials, RegistrationRequest, RegistrationResponse};
pub use client::BridgeClient;
pub use error::Error;
pub use eventstream::{EventFrame, EventStream, SseDecoder};
pub use model::{Merge, Resource, ResourceRef, StreamBatch};
pub use transport::{TlsMode, TransportConfig};
