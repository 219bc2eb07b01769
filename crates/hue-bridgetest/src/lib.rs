//! In-process fake Hue bridge.
//!
//! [`FakeBridge`] reproduces the parts of a real bridge that a client needs
//! for end-to-end tests: the link-button pairing handshake, the
//! `hue-application-key` gate, the resource collection, per-resource partial
//! updates merged with the same rules as the client, and the event stream.

mod bridge;
pub mod routes;
pub mod state;

pub use bridge::FakeBridge;
pub use state::{BridgeState, BusFrame, USERNAME, UpdateError};
