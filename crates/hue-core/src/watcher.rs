// ── Watcher ──
//
// Keeps a `ResourceCache` in sync with the bridge: one bulk fetch, then a
// single background task folding event-stream patches into the cache until
// the stream ends or the watcher is closed.

use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use hue_api::model::{Resource, decode_frame};
use hue_api::{BridgeClient, EventFrame, EventStream};
use tokio::sync::{Mutex, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::CoreError;
use crate::store::ResourceCache;

// ── WatcherState ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Uninitialized,
    /// Bulk fetch and event-stream setup in progress.
    Loading,
    /// Consumer running; the cache follows the bridge.
    Live,
    /// `close()` called, consumer not yet stopped.
    Closing,
    /// Consumer stopped. Terminal.
    Closed,
}

fn transition(state: &watch::Sender<WatcherState>, to: WatcherState) {
    let from = state.send_replace(to);
    debug!(?from, ?to, "watcher state");
}

// ── Watcher ──────────────────────────────────────────────────────

/// Live mirror of a bridge's resources.
///
/// Dropping a `Watcher` cancels its consumer without waiting for it; call
/// [`close`](Self::close) to wait.
pub struct Watcher {
    cache: Arc<ResourceCache>,
    state: Arc<watch::Sender<WatcherState>>,
    cancel: CancellationToken,
    /// Fired by the consumer right before it exits. Taken by the first
    /// `close()`; later callers find `None` once it has completed.
    done: Mutex<Option<oneshot::Receiver<()>>>,
}

impl Watcher {
    /// Open the event stream, fetch every resource, and start following the
    /// stream.
    ///
    /// The stream is opened first so that updates emitted while the fetch is
    /// in flight are buffered and replayed on top of the loaded snapshot.
    /// Any failure before the consumer starts is returned and leaves no
    /// background task behind.
    pub async fn connect(client: &BridgeClient) -> Result<Self, CoreError> {
        let (state, _) = watch::channel(WatcherState::Uninitialized);
        transition(&state, WatcherState::Loading);

        let frames = client.event_stream().await?;

        let initial = client.resources().await?;
        info!(count = initial.len(), "loaded initial resources");

        Ok(Self::start(state, initial, frames))
    }

    /// Start a watcher over an already-fetched snapshot and an arbitrary
    /// frame source. Must be called inside a Tokio runtime.
    pub fn from_parts<S>(initial: Vec<Resource>, frames: S) -> Self
    where
        S: Stream<Item = Result<EventFrame, hue_api::Error>> + Send + 'static,
    {
        let (state, _) = watch::channel(WatcherState::Loading);
        Self::start(state, initial, Box::pin(frames))
    }

    fn start(state: watch::Sender<WatcherState>, initial: Vec<Resource>, frames: EventStream) -> Self {
        let cache = Arc::new(ResourceCache::new());
        cache.load(initial);

        let state = Arc::new(state);
        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();

        transition(&state, WatcherState::Live);
        tokio::spawn(consume(
            frames,
            Arc::clone(&cache),
            Arc::clone(&state),
            cancel.clone(),
            done_tx,
        ));

        Self {
            cache,
            state,
            cancel,
            done: Mutex::new(Some(done_rx)),
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Independent copies of every mirrored resource.
    pub fn snapshot(&self) -> Vec<Resource> {
        self.cache.snapshot()
    }

    pub fn resource(&self, id: &str) -> Option<Resource> {
        self.cache.get(id)
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Cache revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }

    /// Change notifications that end with [`CoreError::WatcherClosed`]
    /// once the consumer has stopped.
    pub fn changes(&self) -> Changes {
        Changes {
            revision: self.cache.subscribe(),
            state: self.state.subscribe(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop the consumer and wait until it has exited.
    ///
    /// No mutation reaches the cache after this returns. There is no
    /// timeout. Calling it again is a no-op.
    pub async fn close(&self) {
        let mut done = self.done.lock().await;
        let Some(rx) = done.take() else {
            return;
        };

        self.state.send_if_modified(|s| {
            if *s == WatcherState::Live {
                *s = WatcherState::Closing;
                true
            } else {
                false
            }
        });
        self.cancel.cancel();

        // Err means the consumer panicked; it is gone either way.
        let _ = rx.await;
        info!("watcher closed");
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Changes ──────────────────────────────────────────────────────

/// Stream-like view over cache revisions, see [`Watcher::changes`].
pub struct Changes {
    revision: watch::Receiver<u64>,
    state: watch::Receiver<WatcherState>,
}

impl Changes {
    /// Wait for the next cache revision.
    ///
    /// Revisions that landed before the consumer stopped are still
    /// delivered; after that, returns [`CoreError::WatcherClosed`].
    pub async fn next(&mut self) -> Result<u64, CoreError> {
        loop {
            if self.revision.has_changed().unwrap_or(false) {
                return Ok(*self.revision.borrow_and_update());
            }
            if *self.state.borrow_and_update() == WatcherState::Closed {
                return Err(CoreError::WatcherClosed);
            }

            tokio::select! {
                biased;
                r = self.revision.changed() => {
                    r.map_err(|_| CoreError::WatcherClosed)?;
                    return Ok(*self.revision.borrow_and_update());
                }
                r = self.state.changed() => {
                    r.map_err(|_| CoreError::WatcherClosed)?;
                }
            }
        }
    }
}

// ── Background consumer ──────────────────────────────────────────

async fn consume(
    mut frames: EventStream,
    cache: Arc<ResourceCache>,
    state: Arc<watch::Sender<WatcherState>>,
    cancel: CancellationToken,
    done: oneshot::Sender<()>,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("watcher cancelled");
                break;
            }
            frame = frames.next() => match frame {
                Some(Ok(frame)) => apply_frame(&cache, &frame),
                Some(Err(e)) => {
                    warn!(error = %e, "event stream failed, watcher stopping");
                    break;
                }
                None => {
                    info!("event stream ended, watcher stopping");
                    break;
                }
            }
        }
    }

    // Dropping the stream closes the connection.
    drop(frames);
    transition(&state, WatcherState::Closed);
    let _ = done.send(());
}

fn apply_frame(cache: &ResourceCache, frame: &EventFrame) {
    match decode_frame(&frame.data) {
        Ok(batches) => {
            let applied = cache.apply_batches(&batches);
            trace!(id = ?frame.id, batches = batches.len(), applied, "applied event frame");
        }
        Err(e) => {
            warn!(error = %e, id = ?frame.id, "dropping undecodable event frame");
        }
    }
}
