// ── CLIP v2 data model ──
//
// Resource types shared by the client, the watcher cache, and the fake
// bridge, plus the merge engine that applies partial updates to them.

mod event;
mod merge;
mod resource;

pub use event::{
    ApiResponse, BATCH_UPDATE, ErrorDescription, ResourceRef, StreamBatch, decode_frame,
};
pub use merge::{Merge, ZeroValue, merge_group, merge_scalar};
pub use resource::{
    Color, ColorXy, Dimming, Dynamics, Metadata, On, Owner, Resource, TYPE_BRIDGE_HOME,
    TYPE_GROUPED_LIGHT, TYPE_LIGHT, TYPE_ZONE,
};
