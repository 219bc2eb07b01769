//! Shared state behind the fake bridge's HTTP handlers.
//!
//! Handlers receive `State<Arc<BridgeState>>` from axum. Every mutation goes
//! through a short `std::sync::Mutex` critical section; nothing here is held
//! across an `.await`. Lock order is `resources`, then `seq`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hue_api::model::{Merge, Resource, StreamBatch};
use hue_api::RegistrationResponse;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Application key handed out by the fake bridge.
pub const USERNAME: &str = "username";

pub(crate) const BUTTON_NOT_PRESSED: &str = "button has not been pressed";
pub(crate) const INVALID_USERNAME: &str = "invalid username supplied";

const BUS_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// BusFrame: SSE payload
// ---------------------------------------------------------------------------

/// One event-stream frame, already serialized.
#[derive(Clone, Debug)]
pub struct BusFrame {
    pub seq: u64,
    pub data: String,
}

// ---------------------------------------------------------------------------
// UpdateError
// ---------------------------------------------------------------------------

/// Why a per-resource update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// No resource with this id, or it is registered under another type.
    NotFound,
}

// ---------------------------------------------------------------------------
// BridgeState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Pairing {
    api_requested: bool,
    button_pressed: bool,
}

/// Resources, pairing flags, and the event bus of one fake bridge.
pub struct BridgeState {
    resources: Mutex<BTreeMap<String, Resource>>,
    pairing: Mutex<Pairing>,
    bus: broadcast::Sender<BusFrame>,
    /// Next frame number. Held while sending so bus order matches numbering.
    seq: Mutex<u64>,
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BridgeState {
    pub fn new() -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            resources: Mutex::new(BTreeMap::new()),
            pairing: Mutex::new(Pairing::default()),
            bus,
            seq: Mutex::new(0),
        }
    }

    // ── Pairing ──────────────────────────────────────────────────────

    /// Handle one pairing request.
    ///
    /// The first request only arms the bridge; a key is issued once a
    /// request has been seen *and* the button has been pressed.
    pub fn pair(&self) -> RegistrationResponse {
        let mut p = lock(&self.pairing);
        if p.api_requested && p.button_pressed {
            info!("pairing accepted");
            RegistrationResponse::success(USERNAME)
        } else {
            p.api_requested = true;
            debug!("pairing refused, button not pressed");
            RegistrationResponse::error(BUTTON_NOT_PRESSED)
        }
    }

    pub fn press_button(&self) {
        lock(&self.pairing).button_pressed = true;
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Register or replace a resource.
    pub fn add_resource(&self, resource: Resource) {
        debug!(id = %resource.id, rtype = %resource.resource_type, "adding resource");
        lock(&self.resources).insert(resource.id.clone(), resource);
    }

    pub fn resource(&self, id: &str) -> Option<Resource> {
        lock(&self.resources).get(id).cloned()
    }

    pub fn resources(&self) -> Vec<Resource> {
        lock(&self.resources).values().cloned().collect()
    }

    /// Merge `patch` into the resource registered as `resource_type/id` and
    /// broadcast the change as an `update` batch.
    ///
    /// The broadcast happens before the resource lock is released, so
    /// subscribers see updates in the order they were applied.
    pub fn apply_update(
        &self,
        resource_type: &str,
        id: &str,
        patch: &Resource,
    ) -> Result<(), UpdateError> {
        let mut resources = lock(&self.resources);
        let dest = resources
            .get_mut(id)
            .filter(|r| r.resource_type == resource_type)
            .ok_or(UpdateError::NotFound)?;
        dest.merge_from(patch);

        let mut event = patch.clone();
        event.id = id.to_owned();
        event.resource_type = resource_type.to_owned();
        self.publish(&[StreamBatch::update(vec![event])]);
        drop(resources);
        Ok(())
    }

    // ── Event bus ────────────────────────────────────────────────────

    /// Broadcast one frame made of the given batches.
    pub fn publish(&self, batches: &[StreamBatch]) {
        match serde_json::to_string(batches) {
            Ok(data) => self.publish_raw(data),
            Err(e) => tracing::warn!(error = %e, "failed to encode stream batches"),
        }
    }

    /// Broadcast a frame with arbitrary payload, valid JSON or not.
    pub fn publish_raw(&self, data: impl Into<String>) {
        let data = data.into();
        let mut seq = lock(&self.seq);
        // No subscribers is fine: events are fire-and-forget.
        let _ = self.bus.send(BusFrame { seq: *seq, data });
        *seq += 1;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusFrame> {
        self.bus.subscribe()
    }

    /// Number of connected event-stream clients.
    pub fn subscriber_count(&self) -> usize {
        self.bus.receiver_count()
    }
}
