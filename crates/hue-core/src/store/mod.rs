// ── Store ──
//
// In-memory state mirrored from the bridge.

mod cache;

pub use cache::ResourceCache;
