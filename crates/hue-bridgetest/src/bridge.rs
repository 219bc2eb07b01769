// FakeBridge: the router from `routes` served on an ephemeral loopback port.

use std::net::SocketAddr;
use std::sync::Arc;

use hue_api::model::{Resource, StreamBatch};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::routes::{AppState, build_router};
use crate::state::BridgeState;

/// A fake Hue bridge, by default listening on `127.0.0.1`.
///
/// Speaks plain HTTP, so point a [`BridgeClient`](hue_api::BridgeClient) at
/// [`url()`](Self::url) with the default transport. Dropping the bridge
/// stops the server without waiting for it.
pub struct FakeBridge {
    addr: SocketAddr,
    url: Url,
    state: Arc<BridgeState>,
    cancel: CancellationToken,
    server: Option<JoinHandle<()>>,
}

impl FakeBridge {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> std::io::Result<Self> {
        Self::bind(("127.0.0.1", 0)).await
    }

    /// Bind `addr` and start serving.
    pub async fn bind(addr: impl ToSocketAddrs) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let url = Url::parse(&format!("http://{addr}")).map_err(std::io::Error::other)?;

        let state = Arc::new(BridgeState::new());
        let cancel = CancellationToken::new();
        let app = build_router(AppState {
            bridge: Arc::clone(&state),
            shutdown: cancel.clone(),
        });

        let shutdown = cancel.clone();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await;
            if let Err(e) = result {
                warn!(error = %e, "fake bridge server failed");
            }
            debug!("fake bridge server stopped");
        });

        info!(%addr, "fake bridge listening");
        Ok(Self {
            addr,
            url,
            state,
            cancel,
            server: Some(server),
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared state, for tests that drive it directly.
    pub fn state(&self) -> &Arc<BridgeState> {
        &self.state
    }

    pub fn add_resource(&self, resource: Resource) {
        self.state.add_resource(resource);
    }

    /// Copy of the resource with this id, as the bridge currently holds it.
    pub fn resource(&self, id: &str) -> Option<Resource> {
        self.state.resource(id)
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.state.resources()
    }

    /// Simulate a press of the physical link button.
    pub fn press_button(&self) {
        self.state.press_button();
    }

    /// Send one event-stream frame carrying `batches` to every connected client.
    pub fn publish(&self, batches: &[StreamBatch]) {
        self.state.publish(batches);
    }

    /// Send one event-stream frame with an arbitrary payload.
    pub fn publish_raw(&self, data: impl Into<String>) {
        self.state.publish_raw(data);
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.subscriber_count()
    }

    /// Stop accepting connections, end open event streams, and wait for
    /// the server task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(server) = self.server.take() {
            if let Err(e) = server.await {
                warn!(error = %e, "fake bridge server task panicked");
            }
        }
    }
}

impl Drop for FakeBridge {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
