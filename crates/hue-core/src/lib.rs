//! Live resource mirror between `hue-api` and its consumers.
//!
//! - **[`Watcher`]**: [`connect()`](Watcher::connect) loads every resource
//!   from the bridge, opens the event stream, and spawns one background task
//!   that merges each incoming patch into the cache.
//!   [`close()`](Watcher::close) stops it and waits for it to exit.
//!
//! - **[`ResourceCache`]**: id-keyed store with copy-out reads and a
//!   `watch` revision counter for change notification.
//!
//! - **[`BridgeConfig`]**: how to reach one bridge; builds a
//!   [`BridgeClient`](hue_api::BridgeClient).

pub mod config;
pub mod error;
pub mod store;
pub mod watcher;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BridgeConfig, TlsVerification};
pub use error::CoreError;
pub use store::ResourceCache;
pub use watcher::{Changes, Watcher, WatcherState};

pub use hue_api::model::{Resource, StreamBatch};
