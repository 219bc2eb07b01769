//! Axum router and HTTP handlers for the fake bridge.
//!
//! `build_router` is the single entry point. [`FakeBridge`](crate::FakeBridge)
//! serves it on a loopback socket; the tests in `tests/` drive it directly
//! through `tower::ServiceExt::oneshot`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{any, get, post},
};
use futures_util::{Stream, StreamExt, stream};
use hue_api::APP_KEY_HEADER;
use hue_api::model::{ApiResponse, ErrorDescription, Resource, ResourceRef};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::{BridgeState, INVALID_USERNAME, USERNAME, UpdateError};

/// Handler state: the bridge itself plus the server's shutdown token, so
/// open event streams end when the server stops.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<BridgeState>,
    pub shutdown: CancellationToken,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete bridge router.
///
/// Everything under `/clip/v2` and `/eventstream` sits behind the
/// application-key gate; `/api` (pairing) is open.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/clip/v2/resource", get(list_resources))
        .route("/clip/v2/resource/:rtype/:id", any(update_resource))
        .route("/eventstream/clip/v2", get(event_stream))
        .route_layer(middleware::from_fn(require_app_key));

    Router::new()
        .route("/api", post(pair))
        .merge(gated)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn error_response(status: StatusCode) -> Response {
    let description = status.canonical_reason().unwrap_or("error").to_owned();
    let body: ApiResponse<Vec<ResourceRef>> = ApiResponse {
        errors: vec![ErrorDescription { description }],
        data: Vec::new(),
    };
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Credential gate
// ---------------------------------------------------------------------------

async fn require_app_key(req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get(APP_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == USERNAME);

    if !authorized {
        debug!(path = %req.uri().path(), "rejecting request without valid app key");
        return (StatusCode::FORBIDDEN, INVALID_USERNAME).into_response();
    }
    next.run(req).await
}

// ---------------------------------------------------------------------------
// POST /api
// ---------------------------------------------------------------------------

pub(crate) async fn pair(State(st): State<AppState>) -> impl IntoResponse {
    Json(vec![st.bridge.pair()])
}

// ---------------------------------------------------------------------------
// GET /clip/v2/resource
// ---------------------------------------------------------------------------

pub(crate) async fn list_resources(State(st): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(st.bridge.resources()))
}

// ---------------------------------------------------------------------------
// /clip/v2/resource/:rtype/:id
// ---------------------------------------------------------------------------

/// Only `PUT` is supported. The body is decoded by hand so a malformed
/// patch maps to 400 rather than axum's extractor rejections.
pub(crate) async fn update_resource(
    State(st): State<AppState>,
    Path((rtype, id)): Path<(String, String)>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::PUT {
        return error_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let Ok(patch) = serde_json::from_slice::<Resource>(&body) else {
        return error_response(StatusCode::BAD_REQUEST);
    };

    match st.bridge.apply_update(&rtype, &id, &patch) {
        Ok(()) => {
            info!(%rtype, %id, "resource updated");
            Json(ApiResponse::ok(vec![ResourceRef { rid: id, rtype }])).into_response()
        }
        Err(UpdateError::NotFound) => error_response(StatusCode::NOT_FOUND),
    }
}

// ---------------------------------------------------------------------------
// GET /eventstream/clip/v2  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn event_stream(State(st): State<AppState>) -> impl IntoResponse {
    let rx = st.bridge.subscribe();
    debug!("event stream client connected");

    // Real bridges open with a comment; it also forces the headers out.
    let hello = stream::once(async { Ok(Event::default().comment("hi")) });
    let events = hello
        .chain(broadcast_to_sse(BroadcastStream::new(rx)))
        .take_until(st.shutdown.cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::new())
}

fn broadcast_to_sse(
    rx: BroadcastStream<crate::state::BusFrame>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    rx.filter_map(|msg| async move {
        match msg {
            Ok(frame) => Some(Ok(Event::default()
                .id(format!("{}:0", frame.seq))
                .data(frame.data))),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "event stream client lagged, frames dropped");
                None
            }
        }
    })
}
