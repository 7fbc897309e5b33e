// ── Entity store ──
//
// Flat per-kind registries with explicit ownership links between them.

mod collection;
mod entity_store;
mod query;

pub use entity_store::EntityStore;
