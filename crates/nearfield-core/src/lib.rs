//! Client-side cache and found/lost notifications for the neard NFC daemon.
//!
//! This crate mirrors the daemon's object graph (adapters, the tags and
//! peer devices they see, and the records those carry) and reports changes
//! to application code:
//!
//! - **[`Context`]**: owns the directory handle, the cache and the
//!   callback table. [`connect()`](Context::connect) subscribes and
//!   enumerates; events are applied by [`handle_event`](Context::handle_event),
//!   [`process_pending`](Context::process_pending) or the async
//!   [`run`](Context::run) loop.
//!
//! - **[`EntityStore`]**: flat per-kind registries keyed by path, with
//!   explicit owner links. Listings and property queries return detached
//!   snapshots ([`AdapterProperties`], [`TagProperties`], ...).
//!
//! - **Callbacks**: found callbacks fire at most once per entity and never
//!   before the owner was reported; lost callbacks fire children-first on
//!   every removal, while the entity can still be queried.
//!
//! - **[`Command`]**: poll control, adapter power, and record write/push,
//!   resolved against the cache before anything is sent to the daemon.

pub mod command;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod store;

mod convert;
mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::ContextConfig;
pub use context::{ConnectionState, Context};
pub use error::CoreError;
pub use snapshot::{
    AdapterProperties, DeviceProperties, RecordProperties, TagProperties, release,
};
pub use store::EntityStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Adapter, AdapterMode, AdapterPath, AdapterProperty, Device, DevicePath, EntityKind, PollMode,
    Record, RecordFields, RecordOwner, RecordPath, RecordType, Tag, TagPath,
};
