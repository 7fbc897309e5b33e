// ── Context ──
//
// Owns the directory handle, the entity store and the callback table.
// Everything runs on the thread that drives the context: events are
// applied one at a time, in delivery order, and queries read the same
// store synchronously.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nearfield_api::{Directory, DirectoryEvent};

use crate::config::ContextConfig;
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::model::{AdapterPath, AdapterProperty, DevicePath, RecordPath, TagPath};
use crate::snapshot::{AdapterProperties, DeviceProperties, RecordProperties, TagProperties};
use crate::store::EntityStore;
use crate::sync::SyncEngine;

// ── ConnectionState ──────────────────────────────────────────────

/// Whether the context is attached to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

// ── Context ──────────────────────────────────────────────────────

/// The client-side mirror of the daemon's object graph.
///
/// Construct with [`new`](Self::new), register callbacks, then
/// [`connect`](Self::connect). Directory events are applied by
/// [`handle_event`](Self::handle_event),
/// [`process_pending`](Self::process_pending) or [`run`](Self::run).
/// Dropping a connected context tears the graph down, firing lost
/// callbacks for everything still cached.
pub struct Context<D: Directory> {
    pub(crate) config: ContextConfig,
    pub(crate) directory: D,
    pub(crate) store: EntityStore,
    pub(crate) dispatcher: Dispatcher,
    events: Option<mpsc::UnboundedReceiver<DirectoryEvent>>,
    state: ConnectionState,
}

impl<D: Directory> Context<D> {
    /// Create a context. Does no I/O: call [`connect`](Self::connect) to
    /// subscribe and load the initial state.
    pub fn new(directory: D, config: ContextConfig) -> Self {
        Self {
            config,
            directory,
            store: EntityStore::new(),
            dispatcher: Dispatcher::default(),
            events: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    /// The live entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    // ── Callback registration ────────────────────────────────────

    pub fn on_adapter_added(&mut self, callback: impl FnMut(&AdapterPath) + 'static) {
        self.dispatcher.on_adapter_added = Some(Box::new(callback));
    }

    pub fn on_adapter_removed(&mut self, callback: impl FnMut(&AdapterPath) + 'static) {
        self.dispatcher.on_adapter_removed = Some(Box::new(callback));
    }

    /// Called with the adapter, the property name and its new value.
    pub fn on_adapter_property_changed(
        &mut self,
        callback: impl FnMut(&AdapterPath, &str, &AdapterProperty) + 'static,
    ) {
        self.dispatcher.on_adapter_property_changed = Some(Box::new(callback));
    }

    /// Called once per tag, after its adapter has been reported.
    pub fn on_tag_found(&mut self, callback: impl FnMut(&TagPath) + 'static) {
        self.dispatcher.on_tag_found = Some(Box::new(callback));
    }

    pub fn on_tag_lost(&mut self, callback: impl FnMut(&TagPath) + 'static) {
        self.dispatcher.on_tag_lost = Some(Box::new(callback));
    }

    pub fn on_device_found(&mut self, callback: impl FnMut(&DevicePath) + 'static) {
        self.dispatcher.on_device_found = Some(Box::new(callback));
    }

    pub fn on_device_lost(&mut self, callback: impl FnMut(&DevicePath) + 'static) {
        self.dispatcher.on_device_lost = Some(Box::new(callback));
    }

    /// Called once per record, after its tag or device has been reported.
    pub fn on_record_found(&mut self, callback: impl FnMut(&RecordPath) + 'static) {
        self.dispatcher.on_record_found = Some(Box::new(callback));
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Subscribe to directory events, then load every existing object.
    ///
    /// Connecting twice is a no-op. On failure the context stays
    /// disconnected and nothing is cached.
    pub fn connect(&mut self) -> Result<(), CoreError> {
        if self.is_connected() {
            debug!("already connected");
            return Ok(());
        }

        let events = self.directory.subscribe().map_err(|e| {
            warn!(service = %self.config.service, error = %e, "event subscription failed");
            CoreError::from(e)
        })?;

        let objects = if self.config.enumerate_on_connect {
            self.directory.enumerate().map_err(|e| {
                warn!(service = %self.config.service, error = %e, "enumeration failed");
                CoreError::from(e)
            })?
        } else {
            Vec::new()
        };

        self.events = Some(events);
        self.state = ConnectionState::Connected;
        self.engine().apply_enumeration(objects);

        info!(
            service = %self.config.service,
            adapters = self.store.adapter_count(),
            "connected to directory"
        );
        Ok(())
    }

    /// Drop every cached entity, firing lost callbacks newest-first, and
    /// stop listening to the directory.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }
        self.engine().teardown();
        self.events = None;
        self.state = ConnectionState::Disconnected;
        debug!("disconnected");
    }

    // ── Event loop ───────────────────────────────────────────────

    /// Apply one directory event. Ignored while disconnected.
    pub fn handle_event(&mut self, event: DirectoryEvent) {
        if !self.is_connected() {
            debug!(path = %event.path(), "event while disconnected ignored");
            return;
        }
        self.engine().apply_event(event);
    }

    /// Apply every event already queued, without waiting. Returns how
    /// many were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Apply events as they arrive until `cancel` fires or the directory
    /// closes its stream.
    ///
    /// A closed stream leaves the context disconnected with its graph torn
    /// down; cancellation leaves it connected so the loop can be resumed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), CoreError> {
        let Some(mut events) = self.events.take() else {
            return Err(CoreError::Transport {
                message: "not connected".into(),
            });
        };

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("event loop cancelled");
                    self.events = Some(events);
                    return Ok(());
                }
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event);
                }
            }
        }

        warn!(service = %self.config.service, "directory closed its event stream");
        self.disconnect();
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn list_adapters(&self) -> Result<Vec<AdapterPath>, CoreError> {
        self.store.list_adapters()
    }

    pub fn adapter_properties(&self, adapter: impl AsRef<str>) -> Result<AdapterProperties, CoreError> {
        self.store.adapter_properties(adapter)
    }

    pub fn list_tags(&self, adapter: impl AsRef<str>) -> Result<Vec<TagPath>, CoreError> {
        self.store.list_tags(adapter)
    }

    pub fn tag_properties(&self, tag: impl AsRef<str>) -> Result<TagProperties, CoreError> {
        self.store.tag_properties(tag)
    }

    pub fn list_devices(&self, adapter: impl AsRef<str>) -> Result<Vec<DevicePath>, CoreError> {
        self.store.list_devices(adapter)
    }

    pub fn device_properties(&self, device: impl AsRef<str>) -> Result<DeviceProperties, CoreError> {
        self.store.device_properties(device)
    }

    pub fn list_records(&self, owner: impl AsRef<str>) -> Result<Vec<RecordPath>, CoreError> {
        self.store.list_records(owner)
    }

    pub fn record_properties(&self, record: impl AsRef<str>) -> Result<RecordProperties, CoreError> {
        self.store.record_properties(record)
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn engine(&mut self) -> SyncEngine<'_, D> {
        SyncEngine {
            directory: &mut self.directory,
            store: &mut self.store,
            dispatcher: &mut self.dispatcher,
            root: &self.config.root,
        }
    }
}

impl<D: Directory> Drop for Context<D> {
    fn drop(&mut self) {
        if self.is_connected() {
            debug!("context dropped while connected, tearing down");
            self.disconnect();
        }
    }
}
